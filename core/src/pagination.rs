/// Items handed to the renderer per request.
pub const DEFAULT_PAGE_SIZE: usize = 20;
/// Most items ever exposed for one list.
pub const MAX_ITEMS: usize = 200;

/// The slice of `list` a renderer should append next, given it already shows
/// `already_rendered` items. Never reaches past `hard_cap`; empty once the
/// list (or the cap) is exhausted.
#[must_use]
pub fn next_window<T>(list: &[T], already_rendered: usize, page_size: usize, hard_cap: usize) -> &[T] {
    let end_of_list = list.len().min(hard_cap);
    if already_rendered >= end_of_list {
        return &[];
    }
    let end = already_rendered.saturating_add(page_size).min(end_of_list);
    &list[already_rendered..end]
}
