use super::*;

#[test]
fn formats_bold_italic_code_and_breaks() {
    let out = format_message("**bold** and *italic* and `code`\nnext");
    assert_eq!(out, "<strong>bold</strong> and <em>italic</em> and <code>code</code><br>next");
}

#[test]
fn plain_text_is_unchanged() {
    assert_eq!(format_message("just words"), "just words");
}

#[test]
fn markup_in_content_is_escaped() {
    let out = format_message("<script>alert('x')</script> & **b**");
    assert_eq!(out, "&lt;script&gt;alert(&#39;x&#39;)&lt;/script&gt; &amp; <strong>b</strong>");
}

#[test]
fn escaped_text_inside_code_stays_escaped() {
    assert_eq!(format_message("`<b>`"), "<code>&lt;b&gt;</code>");
}

#[test]
fn emphasis_does_not_span_lines() {
    assert_eq!(format_message("*a\nb*"), "*a<br>b*");
}

#[test]
fn unpaired_delimiters_are_left_alone() {
    assert_eq!(format_message("2 * 3 = 6"), "2 * 3 = 6");
}

#[test]
fn escape_html_handles_quotes() {
    assert_eq!(escape_html("\"a\" 'b'"), "&quot;a&quot; &#39;b&#39;");
}
