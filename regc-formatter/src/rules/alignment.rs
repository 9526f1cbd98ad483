// Column alignment rules

/// Right-pad `text` with spaces to `width` characters
pub fn pad_right(text: &str, width: usize) -> String {
    let len = text.chars().count();
    if len >= width {
        text.to_string()
    } else {
        format!("{}{}", text, " ".repeat(width - len))
    }
}

/// Widest entry of a column, zero for an empty column
pub fn column_width<'a, I>(cells: I) -> usize
where
    I: IntoIterator<Item = &'a str>,
{
    cells
        .into_iter()
        .map(|cell| cell.chars().count())
        .max()
        .unwrap_or(0)
}
