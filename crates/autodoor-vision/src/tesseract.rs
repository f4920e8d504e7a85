//! Tesseract CLI 인식 엔진.
//!
//! 설정된 tesseract 실행 파일에 PNG를 stdin으로 넘기고 stdout을 읽는다.
//! 토큰 인식은 TSV 출력(level 5 = 단어)을 파싱한다.
//! 모든 호출은 타임아웃으로 제한되며 초과 시 프로세스를 종료한다.

use std::io::Cursor;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use image::{ImageFormat, RgbaImage};
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, warn};

use autodoor_core::config::RecognitionConfig;
use autodoor_core::error::CoreError;
use autodoor_core::models::frame::Frame;
use autodoor_core::models::token::RecognizedToken;
use autodoor_core::ports::recognition::RecognitionEngine;

/// TSV 단어 레벨
const TSV_WORD_LEVEL: &str = "5";

/// TSV 컬럼 수 (level..text)
const TSV_COLUMNS: usize = 12;

/// Tesseract CLI 래퍼
pub struct TesseractEngine {
    binary: PathBuf,
    language: String,
    timeout: Duration,
}

impl TesseractEngine {
    /// 새 엔진 생성
    pub fn new(binary: impl Into<PathBuf>, language: impl Into<String>, timeout: Duration) -> Self {
        Self {
            binary: binary.into(),
            language: language.into(),
            timeout,
        }
    }

    /// 설정에서 생성
    pub fn from_config(config: &RecognitionConfig) -> Self {
        Self::new(
            config.binary_path.clone(),
            config.language.clone(),
            config.timeout(),
        )
    }

    /// tesseract 실행 (`extra`는 출력 형식 인자, 예: `["tsv"]`)
    async fn run(&self, frame: &Frame, extra: &[&str]) -> Result<String, CoreError> {
        let png = encode_png(frame)?;

        let mut command = Command::new(&self.binary);
        command
            .arg("stdin")
            .arg("stdout")
            .arg("-l")
            .arg(&self.language)
            .args(extra)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let mut child = command.spawn().map_err(|e| {
            CoreError::Recognition(format!(
                "tesseract 실행 실패 ({}): {e}",
                self.binary.display()
            ))
        })?;

        if let Some(mut stdin) = child.stdin.take() {
            tokio::spawn(async move {
                if let Err(e) = stdin.write_all(&png).await {
                    warn!("tesseract stdin 쓰기 실패: {e}");
                }
            });
        }

        let output = tokio::time::timeout(self.timeout, child.wait_with_output())
            .await
            .map_err(|_| {
                CoreError::Recognition(format!(
                    "tesseract 타임아웃: {}ms 초과",
                    self.timeout.as_millis()
                ))
            })?
            .map_err(|e| CoreError::Recognition(format!("tesseract 출력 수집 실패: {e}")))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(CoreError::Recognition(format!(
                "tesseract 종료 코드 {:?}: {}",
                output.status.code(),
                stderr.trim()
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

#[async_trait]
impl RecognitionEngine for TesseractEngine {
    async fn recognize_text(&self, frame: &Frame) -> Result<String, CoreError> {
        let text = self.run(frame, &[]).await?;
        let text = text.trim().to_string();
        debug!(chars = text.chars().count(), "텍스트 인식 완료");
        Ok(text)
    }

    async fn recognize_tokens(&self, frame: &Frame) -> Result<Vec<RecognizedToken>, CoreError> {
        let tsv = self.run(frame, &["tsv"]).await?;
        let tokens = parse_tsv(&tsv);
        debug!(tokens = tokens.len(), "토큰 인식 완료");
        Ok(tokens)
    }

    fn engine_name(&self) -> &str {
        "tesseract-cli"
    }
}

/// 프레임 → PNG 바이트
pub fn encode_png(frame: &Frame) -> Result<Vec<u8>, CoreError> {
    let image = RgbaImage::from_raw(frame.width(), frame.height(), frame.as_rgba().to_vec())
        .ok_or_else(|| CoreError::Internal("프레임 버퍼 크기 불일치".to_string()))?;

    let mut buf = Cursor::new(Vec::new());
    image
        .write_to(&mut buf, ImageFormat::Png)
        .map_err(|e| CoreError::Recognition(format!("PNG 인코딩 실패: {e}")))?;
    Ok(buf.into_inner())
}

/// Tesseract TSV 출력 → 단어 토큰
///
/// 헤더, 단어가 아닌 행, 빈 텍스트, 형식이 깨진 행은 건너뛴다.
pub fn parse_tsv(tsv: &str) -> Vec<RecognizedToken> {
    tsv.lines()
        .filter_map(|line| {
            let cols: Vec<&str> = line.split('\t').collect();
            if cols.len() < TSV_COLUMNS || cols[0] != TSV_WORD_LEVEL {
                return None;
            }
            let text = cols[11..].join("\t").trim().to_string();
            if text.is_empty() {
                return None;
            }
            Some(RecognizedToken {
                text,
                left: cols[6].trim().parse().ok()?,
                top: cols[7].trim().parse().ok()?,
                width: cols[8].trim().parse().ok()?,
                height: cols[9].trim().parse().ok()?,
            })
        })
        .collect()
}
