// Indentation rules

/// Calculate indentation for a given nesting level
pub fn indent_string(level: usize, indent_size: usize) -> String {
    " ".repeat(level * indent_size)
}
