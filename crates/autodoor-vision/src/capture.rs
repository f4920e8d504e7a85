//! 스크린 캡처.
//!
//! xcap 기반 멀티모니터 영역 캡처. 영역이 여러 모니터에 걸치면
//! 각 모니터와의 교집합을 하나의 캔버스에 합성한다.
//! 모니터 밖 부분은 투명 검정으로 남는다.

use async_trait::async_trait;
use image::RgbaImage;
use tracing::debug;
use xcap::Monitor;

use autodoor_core::error::CoreError;
use autodoor_core::models::frame::Frame;
use autodoor_core::models::region::Region;
use autodoor_core::ports::frame_source::FrameSource;

/// 스크린 캡처: xcap 기반 `FrameSource` 구현
pub struct ScreenCapture;

impl ScreenCapture {
    /// 새 캡처 인스턴스 생성
    pub fn new() -> Self {
        Self
    }

    /// 전역 좌표 영역 캡처 (블로킹)
    pub fn capture_region_blocking(region: &Region) -> Result<Frame, CoreError> {
        region.validate()?;

        let monitors = Monitor::all()
            .map_err(|e| CoreError::Capture(format!("모니터 목록 조회 실패: {e}")))?;

        let mut canvas = RgbaImage::new(region.width, region.height);
        let mut covered = 0usize;

        for monitor in monitors {
            let bounds = monitor_bounds(&monitor)?;
            if region.intersect(&bounds).is_none() {
                continue;
            }

            let image = monitor
                .capture_image()
                .map_err(|e| CoreError::Capture(format!("스크린 캡처 실패: {e}")))?;

            compose_into(&mut canvas, region, &bounds, &image);
            covered += 1;
        }

        if covered == 0 {
            return Err(CoreError::Capture(format!(
                "영역이 어떤 모니터와도 겹치지 않음: {region:?}"
            )));
        }

        debug!(
            monitors = covered,
            width = region.width,
            height = region.height,
            "영역 캡처 완료"
        );

        Frame::from_rgba(region.width, region.height, canvas.into_raw())
            .ok_or_else(|| CoreError::Internal("캡처 버퍼 크기 불일치".to_string()))
    }

    /// 사용 가능한 모니터 수
    pub fn monitor_count() -> Result<usize, CoreError> {
        Monitor::all()
            .map(|m| m.len())
            .map_err(|e| CoreError::Capture(format!("모니터 목록 조회 실패: {e}")))
    }
}

impl Default for ScreenCapture {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl FrameSource for ScreenCapture {
    async fn capture(&self, region: &Region) -> Result<Frame, CoreError> {
        let region = *region;
        tokio::task::spawn_blocking(move || Self::capture_region_blocking(&region))
            .await
            .map_err(|e| CoreError::Internal(format!("캡처 작업 실패: {e}")))?
    }
}

/// 모니터의 논리 좌표 경계
fn monitor_bounds(monitor: &Monitor) -> Result<Region, CoreError> {
    let err = |e: xcap::XCapError| CoreError::Capture(format!("모니터 정보 조회 실패: {e}"));
    Ok(Region::new(
        monitor.x().map_err(err)?,
        monitor.y().map_err(err)?,
        monitor.width().map_err(err)?,
        monitor.height().map_err(err)?,
    ))
}

/// 모니터 이미지에서 `region`과 겹치는 부분을 캔버스에 복사
///
/// HiDPI 모니터는 캡처 이미지가 논리 크기보다 크므로 배율을 적용해
/// 최근접 픽셀을 샘플링한다.
pub fn compose_into(canvas: &mut RgbaImage, region: &Region, bounds: &Region, image: &RgbaImage) {
    let Some(overlap) = region.intersect(bounds) else {
        return;
    };
    if bounds.width == 0 || bounds.height == 0 || image.width() == 0 || image.height() == 0 {
        return;
    }

    let scale_x = image.width() as f64 / bounds.width as f64;
    let scale_y = image.height() as f64 / bounds.height as f64;

    for dy in 0..overlap.height {
        let gy = overlap.y as i64 + dy as i64;
        let src_y = (((gy - bounds.y as i64) as f64) * scale_y) as u32;
        let src_y = src_y.min(image.height() - 1);
        let dst_y = (gy - region.y as i64) as u32;

        for dx in 0..overlap.width {
            let gx = overlap.x as i64 + dx as i64;
            let src_x = (((gx - bounds.x as i64) as f64) * scale_x) as u32;
            let src_x = src_x.min(image.width() - 1);
            let dst_x = (gx - region.x as i64) as u32;

            canvas.put_pixel(dst_x, dst_y, *image.get_pixel(src_x, src_y));
        }
    }
}
