use proptest::prelude::*;

/// A current page and a total page count with `1 <= current <= total`.
pub fn page_position(max_pages: u32) -> impl Strategy<Value = (u32, u32)> {
    (1..=max_pages).prop_flat_map(|total| (1..=total, Just(total)))
}

/// Search text as typed by a user, including the empty string.
pub fn search_text() -> impl Strategy<Value = String> {
    "[a-zA-Z ]{0,12}"
}
