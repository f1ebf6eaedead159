/// Split text into lines, each keeping its trailing `"\n"`.
///
/// A text that does not end in a newline still yields a final line, with
/// the terminator appended so every element is consistently terminated.
/// The empty string yields no lines.
pub fn split_lines(text: &str) -> Vec<String> {
    let mut lines: Vec<String> = text.split_inclusive('\n').map(String::from).collect();
    if !text.ends_with('\n') {
        if let Some(last) = lines.last_mut() {
            last.push('\n');
        }
    }
    lines
}
