use regex::Regex;
use std::sync::OnceLock;

pub const VIDEO_EXTENSIONS: [&str; 7] = [".mp4", ".avi", ".mov", ".wmv", ".flv", ".webm", ".mkv"];
pub const IMAGE_EXTENSIONS: [&str; 6] = [".jpg", ".jpeg", ".png", ".gif", ".bmp", ".webp"];

const MAX_TITLE_CHARS: usize = 50;
const MAX_TAGS: usize = 6;
const COMMON_KEYWORDS: [&str; 9] = ["안전", "교육", "장비", "사용법", "점검", "응급처치", "비상대응", "법규", "규정"];

fn regex(cell: &'static OnceLock<Regex>, pattern: &str) -> &'static Regex {
    cell.get_or_init(|| Regex::new(pattern).expect("static pattern compiles"))
}

/// Lower-cased extension including the dot, or an empty string.
pub fn extension_of(filename: &str) -> String {
    std::path::Path::new(filename)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| format!(".{}", ext.to_ascii_lowercase()))
        .unwrap_or_default()
}

pub fn video_content_type(extension: &str) -> &'static str {
    match extension {
        ".mp4" => "video/mp4",
        ".avi" => "video/x-msvideo",
        ".mov" => "video/quicktime",
        ".wmv" => "video/x-ms-wmv",
        ".webm" => "video/webm",
        ".mkv" => "video/x-matroska",
        ".flv" => "video/x-flv",
        _ => "video/mp4",
    }
}

pub fn image_content_type(extension: &str) -> &'static str {
    match extension {
        ".jpg" | ".jpeg" => "image/jpeg",
        ".png" => "image/png",
        ".gif" => "image/gif",
        ".webp" => "image/webp",
        ".bmp" => "image/bmp",
        _ => "image/jpeg",
    }
}

/// Client-supplied file name reduced to characters safe on any filesystem.
pub fn secure_filename(filename: &str) -> String {
    let base = filename.rsplit(['/', '\\']).next().unwrap_or(filename);
    let safe: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '_' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect();
    let safe = safe.trim_start_matches('.');

    if safe.is_empty() {
        "upload".to_string()
    } else {
        safe.to_string()
    }
}

/// Group name as used in folder names: anything but word characters becomes `_`.
pub fn safe_group_name(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_alphanumeric() || c == '_' { c } else { '_' })
        .collect()
}

/// Collapses runs of `_`, trims them from both ends and caps the length.
pub fn tidy_underscores(text: &str) -> String {
    static UNDERSCORES: OnceLock<Regex> = OnceLock::new();
    let collapsed = regex(&UNDERSCORES, r"_+").replace_all(text, "_");
    let trimmed = collapsed.trim_matches('_');

    if trimmed.chars().count() > MAX_TITLE_CHARS {
        let cut: String = trimmed.chars().take(MAX_TITLE_CHARS).collect();
        cut.trim_end_matches('_').to_string()
    } else {
        trimmed.to_string()
    }
}

/// Title turned into something usable inside an object key.
pub fn make_filename_safe(text: &str) -> String {
    static RESERVED: OnceLock<Regex> = OnceLock::new();
    static WHITESPACE: OnceLock<Regex> = OnceLock::new();

    let unescaped = unescape_html(text);
    let replaced = regex(&RESERVED, r#"[<>:"/\\|?*]"#).replace_all(&unescaped, "_");
    let replaced = regex(&WHITESPACE, r"\s+").replace_all(&replaced, "_");
    let safe = tidy_underscores(&replaced);

    if safe.is_empty() {
        "Unknown_Title".to_string()
    } else {
        safe
    }
}

/// The handful of entities the translation API emits.
pub fn unescape_html(text: &str) -> String {
    text.replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&#x27;", "'")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}

/// Search tags: up to three bullet items, up to three numbered items, then
/// common safety keywords found in the text. Unique, at most six.
pub fn extract_tags(content: &str) -> Vec<String> {
    static BULLETS: OnceLock<Regex> = OnceLock::new();
    static NUMBERED: OnceLock<Regex> = OnceLock::new();

    let mut keywords: Vec<String> = Vec::new();

    keywords.extend(
        regex(&BULLETS, r"[•·▪▫◦‣⁃]\s*([^•·▪▫◦‣⁃\n]+)")
            .captures_iter(content)
            .take(3)
            .map(|caps| caps[1].trim().to_string()),
    );
    keywords.extend(
        regex(&NUMBERED, r"\d+\.\s*([^\d\n]+)")
            .captures_iter(content)
            .take(3)
            .map(|caps| caps[1].trim().to_string()),
    );

    for keyword in COMMON_KEYWORDS {
        if content.contains(keyword) && !keywords.iter().any(|k| k == keyword) {
            keywords.push(keyword.to_string());
            if keywords.len() >= MAX_TAGS {
                break;
            }
        }
    }

    let mut unique: Vec<String> = Vec::new();
    for keyword in keywords {
        if keyword.chars().count() > 1 && !unique.contains(&keyword) {
            unique.push(keyword);
        }
        if unique.len() >= MAX_TAGS {
            break;
        }
    }
    unique
}
