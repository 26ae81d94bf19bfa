//! Scan session: state machine Idle -> Locked untuk layar scan.
//!
//! Satu session per layar scan yang aktif. Session menerima stream
//! DetectionEvent dari kamera, menyaringnya lewat geometry gate, dan
//! menghasilkan paling banyak satu kandidat locked per siklus edit.
//! Draft kartu hidup di dalam state Locked, jadi invariant "draft hanya
//! ada selama locked" dijaga oleh type system, bukan konvensi.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::card::{CardDraft, CouponType};
use crate::scan::geometry::{is_fully_inside, Rect, Viewport};
use crate::validation::{validate_card_draft, DraftValidation};

// Ukuran kotak capture relatif terhadap viewport, dari layout layar scan.
const BARCODE_BOX_WIDTH_FRAC: f64 = 0.75;
const BARCODE_BOX_HEIGHT_FRAC: f64 = 0.15;
const QR_BOX_FRAC: f64 = 0.6;

/// Mode scan: menentukan bentuk kotak capture dan symbology yang
/// diminta ke kamera.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScanType {
    Barcode,
    Qr,
}

impl ScanType {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "barcode" => Some(ScanType::Barcode),
            "qr" => Some(ScanType::Qr),
            _ => None,
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            ScanType::Barcode => ScanType::Qr,
            ScanType::Qr => ScanType::Barcode,
        }
    }

    /// Symbology yang boleh dikirim kamera pada mode ini.
    pub fn allowed_symbologies(&self) -> &'static [Symbology] {
        match self {
            ScanType::Barcode => &[Symbology::Ean13, Symbology::Ean8, Symbology::Code128],
            ScanType::Qr => &[Symbology::Qr],
        }
    }

    /// Kotak capture untuk viewport saat ini, selalu di tengah layar.
    /// Mode barcode memakai kotak lebar pendek, mode qr kotak persegi.
    pub fn target_box(&self, viewport: Viewport) -> Rect {
        let (box_width, box_height) = match self {
            ScanType::Barcode => (
                viewport.width * BARCODE_BOX_WIDTH_FRAC,
                viewport.height * BARCODE_BOX_HEIGHT_FRAC,
            ),
            ScanType::Qr => (viewport.width * QR_BOX_FRAC, viewport.width * QR_BOX_FRAC),
        };
        Rect::new(
            (viewport.width - box_width) / 2.0,
            (viewport.height - box_height) / 2.0,
            box_width,
            box_height,
        )
    }
}

/// Arah kamera.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CameraFacing {
    Back,
    Front,
}

impl CameraFacing {
    pub fn toggled(self) -> Self {
        match self {
            CameraFacing::Back => CameraFacing::Front,
            CameraFacing::Front => CameraFacing::Back,
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "back" => Some(CameraFacing::Back),
            "front" => Some(CameraFacing::Front),
            _ => None,
        }
    }
}

/// Mode flash kamera.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlashMode {
    Off,
    Torch,
}

impl FlashMode {
    pub fn toggled(self) -> Self {
        match self {
            FlashMode::Off => FlashMode::Torch,
            FlashMode::Torch => FlashMode::Off,
        }
    }
}

/// Standar encoding barcode yang dilaporkan kamera.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Symbology {
    Ean13,
    Ean8,
    Code128,
    Qr,
}

impl Symbology {
    pub fn as_str(&self) -> &'static str {
        match self {
            Symbology::Ean13 => "ean13",
            Symbology::Ean8 => "ean8",
            Symbology::Code128 => "code128",
            Symbology::Qr => "qr",
        }
    }
}

/// Satu sighting barcode dari kamera. Ephemeral, tidak dipersist.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectionEvent {
    pub payload: String,
    pub bounds: Rect,
    pub symbology: Symbology,
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum SessionError {
    #[error("Scanner is locked on a candidate; save or discard it first")]
    Locked,
    #[error("No scan candidate is locked")]
    NotLocked,
    #[error("A save is already in progress")]
    SubmitInFlight,
}

/// Fase session. Draft dan flag edit-cycle hanya ada di Locked.
#[derive(Debug)]
enum Phase {
    Idle,
    Locked {
        detection: DetectionEvent,
        draft: CardDraft,
        save_attempted: bool,
        submitting: bool,
    },
}

/// Hasil percobaan save: draft siap dipersist, atau daftar error field.
#[derive(Debug, PartialEq)]
pub enum SubmitAttempt {
    Ready(CardDraft),
    Invalid(DraftValidation),
}

/// Edit parsial pada draft dari form; field None dibiarkan apa adanya.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DraftEdit {
    pub vendor: Option<String>,
    pub coupon_type: Option<CouponType>,
    pub reward_detail: Option<String>,
    pub description: Option<String>,
    pub expiration: Option<DateTime<Utc>>,
}

impl DraftEdit {
    fn apply(self, draft: &mut CardDraft) {
        if let Some(vendor) = self.vendor {
            draft.vendor = vendor;
        }
        if let Some(coupon_type) = self.coupon_type {
            draft.coupon_type = coupon_type;
        }
        if let Some(reward_detail) = self.reward_detail {
            draft.reward_detail = reward_detail;
        }
        if let Some(description) = self.description {
            draft.description = description;
        }
        if let Some(expiration) = self.expiration {
            draft.expiration = expiration;
        }
    }
}

/// State per layar scan. Dibuat saat layar mount, dibuang saat unmount.
#[derive(Debug)]
pub struct ScanSession {
    scan_type: ScanType,
    facing: CameraFacing,
    flash: FlashMode,
    viewport: Viewport,
    phase: Phase,
}

impl ScanSession {
    pub fn new(viewport: Viewport, scan_type: ScanType, facing: CameraFacing) -> Self {
        Self {
            scan_type,
            facing,
            flash: FlashMode::Off,
            viewport,
            phase: Phase::Idle,
        }
    }

    pub fn scan_type(&self) -> ScanType {
        self.scan_type
    }

    pub fn facing(&self) -> CameraFacing {
        self.facing
    }

    pub fn flash(&self) -> FlashMode {
        self.flash
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn locked(&self) -> bool {
        matches!(self.phase, Phase::Locked { .. })
    }

    pub fn submitting(&self) -> bool {
        matches!(
            self.phase,
            Phase::Locked {
                submitting: true,
                ..
            }
        )
    }

    /// Kamera hanya boleh mengirim callback deteksi selama Idle.
    pub fn camera_enabled(&self) -> bool {
        !self.locked()
    }

    /// Kotak capture untuk mode dan viewport saat ini. Selalu dihitung
    /// ulang, tidak ada cache yang bisa basi.
    pub fn target_box(&self) -> Rect {
        self.scan_type.target_box(self.viewport)
    }

    pub fn last_detection(&self) -> Option<&DetectionEvent> {
        match &self.phase {
            Phase::Locked { detection, .. } => Some(detection),
            Phase::Idle => None,
        }
    }

    pub fn draft(&self) -> Option<&CardDraft> {
        match &self.phase {
            Phase::Locked { draft, .. } => Some(draft),
            Phase::Idle => None,
        }
    }

    /// Rotasi atau resize layar.
    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    /// Proses satu deteksi kamera lewat geometry gate.
    ///
    /// Saat Locked semua deteksi diabaikan. Saat Idle, deteksi dengan
    /// symbology di luar mode aktif (callback telat setelah ganti mode)
    /// juga diabaikan. Deteksi pertama yang lolos gate mengunci session
    /// dan mengembalikan draft yang sudah di-seed payload-nya.
    pub fn handle_detection(
        &mut self,
        event: DetectionEvent,
        now: DateTime<Utc>,
    ) -> Option<&CardDraft> {
        if self.locked() {
            return None;
        }
        if !self.scan_type.allowed_symbologies().contains(&event.symbology) {
            return None;
        }
        if !is_fully_inside(&event.bounds, &self.target_box()) {
            return None;
        }

        let draft = CardDraft::seeded(event.payload.clone(), event.symbology, now);
        self.phase = Phase::Locked {
            detection: event,
            draft,
            save_attempted: false,
            submitting: false,
        };
        self.draft()
    }

    /// Locked -> Idle. Membuang kandidat dan draft.
    pub fn release(&mut self) {
        self.phase = Phase::Idle;
    }

    /// Boleh kapan saja, tidak mempengaruhi lock.
    pub fn toggle_facing(&mut self) -> CameraFacing {
        self.facing = self.facing.toggled();
        self.facing
    }

    /// Boleh kapan saja, tidak mempengaruhi lock.
    pub fn toggle_flash(&mut self) -> FlashMode {
        self.flash = self.flash.toggled();
        self.flash
    }

    /// Ganti mode scan. Hanya boleh selama Idle; mengganti bentuk kotak
    /// capture di bawah kandidat yang sedang diedit tidak ada artinya.
    pub fn toggle_scan_type(&mut self) -> Result<ScanType, SessionError> {
        if self.locked() {
            return Err(SessionError::Locked);
        }
        self.scan_type = self.scan_type.toggled();
        Ok(self.scan_type)
    }

    /// Terapkan edit form pada draft.
    ///
    /// Mengembalikan hasil validasi hanya setelah percobaan save pertama
    /// (kebijakan dirty-after-first-submit): sebelum itu None, supaya
    /// form belum menampilkan inline error.
    pub fn edit_draft(
        &mut self,
        edit: DraftEdit,
        now: DateTime<Utc>,
    ) -> Result<Option<DraftValidation>, SessionError> {
        match &mut self.phase {
            Phase::Idle => Err(SessionError::NotLocked),
            Phase::Locked { submitting: true, .. } => Err(SessionError::SubmitInFlight),
            Phase::Locked {
                draft,
                save_attempted,
                ..
            } => {
                edit.apply(draft);
                if *save_attempted {
                    Ok(Some(validate_card_draft(draft, now)))
                } else {
                    Ok(None)
                }
            }
        }
    }

    /// Mulai percobaan save.
    ///
    /// Menandai save_attempted (inline error aktif sejak titik ini) lalu
    /// memvalidasi. Draft valid mengaktifkan guard in-flight dan
    /// mengembalikan snapshot untuk dipersist; draft tidak valid
    /// mengembalikan error per field tanpa menyentuh guard.
    pub fn begin_submit(&mut self, now: DateTime<Utc>) -> Result<SubmitAttempt, SessionError> {
        match &mut self.phase {
            Phase::Idle => Err(SessionError::NotLocked),
            Phase::Locked {
                draft,
                save_attempted,
                submitting,
                ..
            } => {
                *save_attempted = true;
                if *submitting {
                    return Err(SessionError::SubmitInFlight);
                }
                let validation = validate_card_draft(draft, now);
                if !validation.valid {
                    return Ok(SubmitAttempt::Invalid(validation));
                }
                *submitting = true;
                Ok(SubmitAttempt::Ready(draft.clone()))
            }
        }
    }

    /// Save berhasil: kandidat selesai, kembali ke Idle.
    pub fn complete_submit(&mut self) {
        self.release();
    }

    /// Save gagal di store: guard dilepas, draft dipertahankan supaya
    /// user bisa retry atau edit.
    pub fn fail_submit(&mut self) {
        if let Phase::Locked { submitting, .. } = &mut self.phase {
            *submitting = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn session_400x800() -> ScanSession {
        ScanSession::new(
            Viewport::new(400.0, 800.0),
            ScanType::Barcode,
            CameraFacing::Back,
        )
    }

    fn inside_event() -> DetectionEvent {
        DetectionEvent {
            payload: "012345678905".to_string(),
            bounds: Rect::new(60.0, 350.0, 280.0, 100.0),
            symbology: Symbology::Ean13,
        }
    }

    fn fill_draft(session: &mut ScanSession, now: DateTime<Utc>) {
        session
            .edit_draft(
                DraftEdit {
                    vendor: Some("Acme".to_string()),
                    reward_detail: Some("5".to_string()),
                    description: Some("Five off".to_string()),
                    expiration: Some(now + Duration::days(3)),
                    ..Default::default()
                },
                now,
            )
            .unwrap();
    }

    #[test]
    fn test_barcode_target_box_matches_layout() {
        let session = session_400x800();
        let target = session.target_box();
        assert_eq!(target, Rect::new(50.0, 340.0, 300.0, 120.0));
    }

    #[test]
    fn test_qr_target_box_is_square_of_viewport_width() {
        let target = ScanType::Qr.target_box(Viewport::new(400.0, 800.0));
        assert_eq!(target, Rect::new(80.0, 280.0, 240.0, 240.0));
    }

    #[test]
    fn test_in_bounds_detection_locks_and_seeds_draft() {
        let mut session = session_400x800();
        let now = Utc::now();

        let draft = session.handle_detection(inside_event(), now).cloned();
        let draft = draft.expect("detection inside the box should lock");
        assert_eq!(draft.barcode_payload, "012345678905");
        assert_eq!(draft.expiration, now);
        assert!(session.locked());
        assert!(!session.camera_enabled());
    }

    #[test]
    fn test_out_of_bounds_detection_is_ignored() {
        let mut session = session_400x800();
        let event = DetectionEvent {
            payload: "x".to_string(),
            bounds: Rect::new(0.0, 0.0, 50.0, 50.0),
            symbology: Symbology::Ean13,
        };
        assert!(session.handle_detection(event, Utc::now()).is_none());
        assert!(!session.locked());
        assert!(session.camera_enabled());
    }

    #[test]
    fn test_detections_while_locked_are_ignored() {
        let mut session = session_400x800();
        let now = Utc::now();
        session.handle_detection(inside_event(), now);

        let late = DetectionEvent {
            payload: "999999999999".to_string(),
            bounds: Rect::new(60.0, 350.0, 280.0, 100.0),
            symbology: Symbology::Ean13,
        };
        assert!(session.handle_detection(late, now).is_none());
        assert!(session.locked());
        assert_eq!(
            session.last_detection().unwrap().payload,
            "012345678905"
        );
    }

    #[test]
    fn test_wrong_symbology_for_mode_is_ignored() {
        let mut session = session_400x800();
        let event = DetectionEvent {
            payload: "{\"v\":1}".to_string(),
            bounds: Rect::new(60.0, 350.0, 280.0, 100.0),
            symbology: Symbology::Qr,
        };
        assert!(session.handle_detection(event, Utc::now()).is_none());
        assert!(!session.locked());
    }

    #[test]
    fn test_release_returns_to_idle_and_drops_draft() {
        let mut session = session_400x800();
        let now = Utc::now();
        session.handle_detection(inside_event(), now);
        session.release();

        assert!(!session.locked());
        assert!(session.draft().is_none());
        assert!(session.last_detection().is_none());
        // A new cycle can lock again
        assert!(session.handle_detection(inside_event(), now).is_some());
    }

    #[test]
    fn test_facing_and_flash_toggle_in_any_state() {
        let mut session = session_400x800();
        assert_eq!(session.toggle_facing(), CameraFacing::Front);
        assert_eq!(session.toggle_flash(), FlashMode::Torch);

        session.handle_detection(inside_event(), Utc::now());
        assert_eq!(session.toggle_facing(), CameraFacing::Back);
        assert_eq!(session.toggle_flash(), FlashMode::Off);
        assert!(session.locked());
    }

    #[test]
    fn test_scan_type_toggle_only_while_idle() {
        let mut session = session_400x800();
        assert_eq!(session.toggle_scan_type(), Ok(ScanType::Qr));
        assert_eq!(session.toggle_scan_type(), Ok(ScanType::Barcode));

        session.handle_detection(inside_event(), Utc::now());
        assert_eq!(session.toggle_scan_type(), Err(SessionError::Locked));
        assert_eq!(session.scan_type(), ScanType::Barcode);
    }

    #[test]
    fn test_inline_errors_suppressed_before_first_submit() {
        let mut session = session_400x800();
        let now = Utc::now();
        session.handle_detection(inside_event(), now);

        // Edits before any save attempt report nothing
        let visible = session
            .edit_draft(
                DraftEdit {
                    vendor: Some(String::new()),
                    ..Default::default()
                },
                now,
            )
            .unwrap();
        assert!(visible.is_none());

        // First save attempt on an empty draft surfaces all four errors
        match session.begin_submit(now).unwrap() {
            SubmitAttempt::Invalid(validation) => {
                assert!(!validation.valid);
                assert!(validation.errors.vendor.is_some());
                assert!(validation.errors.reward_detail.is_some());
                assert!(validation.errors.description.is_some());
                assert!(validation.errors.expiration.is_some());
            }
            SubmitAttempt::Ready(_) => panic!("empty draft must not be ready"),
        }

        // From now on every edit re-validates
        let visible = session
            .edit_draft(
                DraftEdit {
                    vendor: Some("Acme".to_string()),
                    ..Default::default()
                },
                now,
            )
            .unwrap();
        let validation = visible.expect("errors are live after first attempt");
        assert!(validation.errors.vendor.is_none());
        assert!(validation.errors.description.is_some());
    }

    #[test]
    fn test_valid_submit_guards_against_double_submit() {
        let mut session = session_400x800();
        let now = Utc::now();
        session.handle_detection(inside_event(), now);
        fill_draft(&mut session, now);

        let attempt = session.begin_submit(now).unwrap();
        assert!(matches!(attempt, SubmitAttempt::Ready(_)));
        assert!(session.submitting());

        // Second submit while one is outstanding is refused
        assert_eq!(session.begin_submit(now), Err(SessionError::SubmitInFlight));
        // Edits are refused as well
        assert_eq!(
            session.edit_draft(DraftEdit::default(), now),
            Err(SessionError::SubmitInFlight)
        );
    }

    #[test]
    fn test_failed_submit_keeps_draft_for_retry() {
        let mut session = session_400x800();
        let now = Utc::now();
        session.handle_detection(inside_event(), now);
        fill_draft(&mut session, now);

        session.begin_submit(now).unwrap();
        session.fail_submit();

        assert!(session.locked());
        assert!(!session.submitting());
        assert_eq!(session.draft().unwrap().vendor, "Acme");
        // Retry goes through again
        assert!(matches!(
            session.begin_submit(now).unwrap(),
            SubmitAttempt::Ready(_)
        ));
    }

    #[test]
    fn test_completed_submit_releases_session() {
        let mut session = session_400x800();
        let now = Utc::now();
        session.handle_detection(inside_event(), now);
        fill_draft(&mut session, now);

        session.begin_submit(now).unwrap();
        session.complete_submit();

        assert!(!session.locked());
        assert!(session.draft().is_none());
        assert!(session.camera_enabled());
    }

    #[test]
    fn test_submit_without_lock_is_an_error() {
        let mut session = session_400x800();
        assert_eq!(session.begin_submit(Utc::now()), Err(SessionError::NotLocked));
        assert_eq!(
            session.edit_draft(DraftEdit::default(), Utc::now()),
            Err(SessionError::NotLocked)
        );
    }
}
