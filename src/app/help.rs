use crate::app::{App, AppMode};

/// Number keys that jump to a navigation tab
pub const DIGIT_KEYS: &str = "1-5";

/// Shortcut reference rendered on the help screen
pub const KEY_BINDINGS: [(&str, &str); 9] = [
    (
        DIGIT_KEYS,
        "切換：首頁 / 每日運勢 / 命理諮詢 / 面相分析 / 個人資料（首頁、運勢頁、說明頁）",
    ),
    ("Tab", "下一個分頁（個人資料頁中切換欄位）"),
    ("p", "編輯個人資料（首頁）"),
    ("?", "顯示說明（首頁）"),
    ("Enter", "送出訊息 / 開始分析 / 儲存資料"),
    ("r", "重新觀測運勢 / 分析完成後重新上傳"),
    ("PgUp/PgDn", "捲動對話"),
    ("Esc", "回到首頁"),
    ("Ctrl+C", "離開"),
];

impl App {
    pub fn open_help(&mut self) {
        self.navigate(AppMode::Help);
    }

    pub fn close_help(&mut self) {
        self.navigate(AppMode::Home);
    }
}
