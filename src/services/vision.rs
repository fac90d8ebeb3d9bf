use color_eyre::Result;
use image::ImageFormat;
use std::fs;
use std::path::Path;

/// Shown in place of the analysis when the call fails
pub const FACE_ANALYSIS_FAILED: &str = "分析失敗，請檢查照片是否清晰。";

/// Disclaimer rendered under the upload widget
pub const FACE_ANALYSIS_DISCLAIMER: &str =
    "面相分析僅供參考，不應用作醫療診斷或任何正式決策依據。系統不存儲您的照片，分析後將即刻清除緩存。";

const ACCEPTED_FORMATS: [ImageFormat; 4] = [
    ImageFormat::Jpeg,
    ImageFormat::Png,
    ImageFormat::WebP,
    ImageFormat::Gif,
];

/// Sniffs the MIME type from the image's magic bytes
pub fn detect_mime_type(bytes: &[u8]) -> Result<&'static str> {
    let format = image::guess_format(bytes)
        .map_err(|error| color_eyre::eyre::eyre!("Unrecognized image data: {}", error))?;
    if !ACCEPTED_FORMATS.contains(&format) {
        return Err(color_eyre::eyre::eyre!(
            "Unsupported image format: {:?}",
            format
        ));
    }
    Ok(format.to_mime_type())
}

/// Reads an image file selected by the user, rejecting anything that is not an image
pub fn read_image(path: &Path) -> Result<Vec<u8>> {
    let bytes = fs::read(path)?;
    detect_mime_type(&bytes)?;
    Ok(bytes)
}

/// Turns typed or pasted path text into a path (quotes and `~/` handled)
#[must_use]
pub fn parse_image_path(input: &str) -> Option<std::path::PathBuf> {
    let trimmed = input.trim().trim_matches(|character| character == '"' || character == '\'');
    if trimmed.is_empty() {
        return None;
    }
    if let Some(rest) = trimmed.strip_prefix("~/") {
        let home = directories::BaseDirs::new()?.home_dir().to_path_buf();
        return Some(home.join(rest));
    }
    Some(std::path::PathBuf::from(trimmed))
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_MAGIC: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

    #[test]
    fn test_detects_png_and_jpeg() {
        assert_eq!(detect_mime_type(&PNG_MAGIC).unwrap(), "image/png");
        assert_eq!(
            detect_mime_type(&[0xFF, 0xD8, 0xFF, 0xE0, 0x00]).unwrap(),
            "image/jpeg"
        );
    }

    #[test]
    fn test_rejects_non_image_bytes() {
        assert!(detect_mime_type(b"hello world").is_err());
        assert!(detect_mime_type(&[]).is_err());
    }

    #[test]
    fn test_read_image_rejects_text_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let text_path = dir.path().join("notes.txt");
        fs::write(&text_path, "not an image").unwrap();
        assert!(read_image(&text_path).is_err());

        let png_path = dir.path().join("face.png");
        fs::write(&png_path, PNG_MAGIC).unwrap();
        assert_eq!(read_image(&png_path).unwrap(), PNG_MAGIC.to_vec());
    }

    #[test]
    fn test_parse_image_path_strips_quotes() {
        assert_eq!(
            parse_image_path("  '/tmp/my face.jpg' "),
            Some(std::path::PathBuf::from("/tmp/my face.jpg"))
        );
        assert_eq!(parse_image_path("   "), None);
    }
}
