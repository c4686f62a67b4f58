//! Indentation measurement

/// Indent units at the start of `line` and the number of leading whitespace bytes.
///
/// A tab is one unit and so is every run of `width` spaces; leftover spaces do not count.
/// A tab also resets a partial run of spaces.
pub fn indent_units(line: &str, width: usize) -> (usize, usize) {
    let width = width.max(1);
    let mut units = 0;
    let mut spaces = 0;
    let mut consumed = 0;

    for ch in line.chars() {
        match ch {
            ' ' => {
                spaces += 1;
                if spaces == width {
                    units += 1;
                    spaces = 0;
                }
            }
            '\t' => {
                units += 1;
                spaces = 0;
            }
            _ => break,
        }
        consumed += 1;
    }
    (units, consumed)
}
