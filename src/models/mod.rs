/// [`Post`](post::Post) and the poster and file details it carries.
pub mod post;
/// [`Thread`](thread::Thread), the unit every listing yields.
pub mod thread;

/// Live-service base that entity URLs point at.
pub(crate) const LIVE_URL: &str = "https://boards.4chan.org";

/// Lowercases a board name and strips slashes and surrounding whitespace.
///
/// ```rust
/// assert_eq!(chanfetch::sanitize_board(" /VG/ "), "vg");
/// ```
pub fn sanitize_board(board: &str) -> String {
    board.to_lowercase().replace('/', "").trim().to_string()
}

/// Trims `raw` and maps blank strings to `None`.
pub(crate) fn non_blank(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}
