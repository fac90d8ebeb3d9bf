//! Instruction text framing every model call.
//!
//! Everything here is a pure function of its arguments. The persona is rebuilt
//! per call so a profile edit shows up in the very next request.

use crate::app::UserProfile;
use chrono::NaiveDate;
use serde_json::Value as JsonValue;

/// Task template for the structured daily horoscope request
pub const HOROSCOPE_PROMPT: &str = "請根據用戶的出生生辰，對比今日星象（包含行星相位與流年位置），生成一份極具個人化的每日運勢。請嚴格遵守 JSON Schema 輸出格式。";

/// Task template for the face reading request
pub const VISION_PROMPT: &str = "請分析這張照片中的面部特徵。請關注『三庭五眼』的比例、眉眼的形狀以及氣色。基於面相學知識，分析此人的性格優勢以及近期需要注意的運勢。請以專業命理師口吻條列呈現。";

const PERSONA_OPENING: &str = "你是 \"AstroGuide\"，一位精通東方紫微斗數、八字與西方占星術的資深命理諮詢師。你的說話風格溫柔、神祕但理性，具備高度的同理心。";

const PERSONA_RULES: &str = "能力規範：
1. 跨文化命理分析：解讀用戶的出生資訊，結合東西方觀點（如紫微主星與太陽/上升星座的交互影響）。
2. 同理心回應：當用戶感到焦慮時，先給予情感支持，再從命理角度給予建設性建議。
3. 拒絕宿命論：不使用「你會完蛋」等恐嚇性語言，而是轉化為「此時能量較低，建議守成」。
4. 專業工具使用：你可以調用計算星盤與農曆轉換工具來獲取更精確的數據。

限制：
- 隱私保護：不要求、不保存、不複述與命理無關的個人隱私。
- 嚴格遵守 JSON 格式（對於運勢請求）。
- 優先提供心理層面的造命建議，而非推銷。";

/// Builds the persona instruction, with a user-context block when a profile is known
#[must_use]
pub fn build_system_instruction(profile: Option<&UserProfile>) -> String {
    let mut sections = vec![PERSONA_OPENING.to_string()];
    if let Some(profile) = profile {
        sections.push(user_context_block(profile));
    }
    sections.push(PERSONA_RULES.to_string());
    sections.join("\n\n")
}

fn user_context_block(profile: &UserProfile) -> String {
    format!(
        "【當前諮詢用戶資料】\n姓名：{}\n出生日期：{}\n出生時間：{}\n出生地點：{}\n請務必以此生辰資料為基礎進行占星與命理分析。",
        profile.name, profile.birth_date, profile.birth_time, profile.birth_place
    )
}

/// One-line birth summary used in request text
#[must_use]
pub fn birth_summary(profile: &UserProfile) -> String {
    format!(
        "{}, 生於 {} {} 於 {}",
        profile.name, profile.birth_date, profile.birth_time, profile.birth_place
    )
}

/// User-turn text for the daily horoscope call
#[must_use]
pub fn horoscope_request(profile: &UserProfile, today: NaiveDate) -> String {
    format!(
        "用戶背景：{}。今日日期：{}。請對比今日星象，為該用戶生成今日專屬運勢報告。\n{}",
        birth_summary(profile),
        today.format("%Y-%m-%d"),
        HOROSCOPE_PROMPT
    )
}

/// Opening line shown when a consultation starts; synthesized locally, not a model call
#[must_use]
pub fn chat_greeting(profile: &UserProfile) -> String {
    format!(
        "你好 {}。根據你提供的生辰資料（{} {}），我已為你鎖定了當前的星盤能量。今天的星象在你的人生宮位中激發了獨特的振動。有什麼特別困擾你的事情嗎？無論是職場的轉機、感情的流轉，或是尋找內心的寧靜，我都會結合東西方命理為你解析。",
        profile.name, profile.birth_date, profile.birth_time
    )
}

/// Text turn that feeds a resolved tool result back into the chat session
#[must_use]
pub fn tool_result_message(result: &JsonValue) -> String {
    format!(
        "系統回報工具執行結果: {}。請繼續根據此結果回答用戶。",
        result
    )
}
