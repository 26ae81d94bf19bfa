//! Command handler untuk layar scan: lifecycle session, deteksi,
//! editing draft, dan submit jadi card record.

use chrono::Utc;
use serde::Serialize;

use crate::models::card::{CardDraft, CardView};
use crate::scan::geometry::{Rect, Viewport};
use crate::scan::session::{
    CameraFacing, DetectionEvent, DraftEdit, FlashMode, ScanSession, ScanType, SubmitAttempt,
    Symbology,
};
use crate::validation::{DraftValidation, FieldErrors};
use crate::AppState;

/// Snapshot state scanner untuk frontend. `camera_enabled` adalah sinyal
/// backpressure: kamera berhenti mengirim callback selama locked.
#[derive(Debug, Clone, Serialize)]
pub struct ScannerState {
    pub scan_type: ScanType,
    pub facing: CameraFacing,
    pub flash: FlashMode,
    pub locked: bool,
    pub submitting: bool,
    pub camera_enabled: bool,
    pub target_box: Rect,
    pub allowed_symbologies: Vec<Symbology>,
    pub draft: Option<CardDraft>,
}

impl ScannerState {
    fn snapshot(session: &ScanSession) -> Self {
        Self {
            scan_type: session.scan_type(),
            facing: session.facing(),
            flash: session.flash(),
            locked: session.locked(),
            submitting: session.submitting(),
            camera_enabled: session.camera_enabled(),
            target_box: session.target_box(),
            allowed_symbologies: session.scan_type().allowed_symbologies().to_vec(),
            draft: session.draft().cloned(),
        }
    }
}

/// Hasil submit: kartu tersimpan, atau error per field. Validasi bukan
/// failure, jadi tidak lewat jalur Err.
#[derive(Debug, Clone, Serialize)]
pub struct SubmitOutcome {
    pub card: Option<CardView>,
    pub errors: Option<FieldErrors>,
}

/// Buka scanner saat layar scan mount. Session lama (kalau ada) dibuang.
#[tauri::command]
pub async fn open_scanner(
    state: tauri::State<'_, AppState>,
    viewport_width: f64,
    viewport_height: f64,
) -> Result<ScannerState, String> {
    let config = crate::config::get_config();
    let session = ScanSession::new(
        Viewport::new(viewport_width, viewport_height),
        config.scanner.default_scan_type(),
        config.scanner.default_facing(),
    );

    let mut scanner = state.scanner.lock().map_err(|e| e.to_string())?;
    let snapshot = ScannerState::snapshot(&session);
    *scanner = Some(session);

    crate::log_debug!(
        "SCANNER",
        "Scanner opened",
        serde_json::json!({ "width": viewport_width, "height": viewport_height })
    );

    Ok(snapshot)
}

/// Tutup scanner saat layar unmount. Draft yang sedang diedit ikut
/// terbuang (cancel).
#[tauri::command]
pub async fn close_scanner(state: tauri::State<'_, AppState>) -> Result<(), String> {
    let mut scanner = state.scanner.lock().map_err(|e| e.to_string())?;
    *scanner = None;
    Ok(())
}

/// Snapshot state scanner saat ini.
#[tauri::command]
pub async fn get_scanner_state(state: tauri::State<'_, AppState>) -> Result<ScannerState, String> {
    let scanner = state.scanner.lock().map_err(|e| e.to_string())?;
    let session = scanner.as_ref().ok_or("Scanner is not open.")?;
    Ok(ScannerState::snapshot(session))
}

/// Update ukuran viewport (rotasi / resize layar).
#[tauri::command]
pub async fn set_scanner_viewport(
    state: tauri::State<'_, AppState>,
    viewport_width: f64,
    viewport_height: f64,
) -> Result<ScannerState, String> {
    let mut scanner = state.scanner.lock().map_err(|e| e.to_string())?;
    let session = scanner.as_mut().ok_or("Scanner is not open.")?;
    session.set_viewport(Viewport::new(viewport_width, viewport_height));
    Ok(ScannerState::snapshot(session))
}

/// Satu sighting barcode dari kamera. Mengembalikan draft yang sudah
/// di-seed saat deteksi lolos gate dan session lock; None saat diabaikan.
#[tauri::command]
pub async fn report_detection(
    state: tauri::State<'_, AppState>,
    event: DetectionEvent,
) -> Result<Option<CardDraft>, String> {
    let mut scanner = state.scanner.lock().map_err(|e| e.to_string())?;
    let session = scanner.as_mut().ok_or("Scanner is not open.")?;

    let draft = session.handle_detection(event, Utc::now()).cloned();
    if let Some(ref draft) = draft {
        crate::log_info!(
            "SCANNER",
            "Scan candidate locked",
            serde_json::json!({ "symbology": draft.symbology.as_str() })
        );
    }
    Ok(draft)
}

/// Ganti kamera depan/belakang. Boleh kapan saja.
#[tauri::command]
pub async fn toggle_camera_facing(
    state: tauri::State<'_, AppState>,
) -> Result<CameraFacing, String> {
    let mut scanner = state.scanner.lock().map_err(|e| e.to_string())?;
    let session = scanner.as_mut().ok_or("Scanner is not open.")?;
    Ok(session.toggle_facing())
}

/// Nyalakan/matikan torch. Boleh kapan saja.
#[tauri::command]
pub async fn toggle_flash(state: tauri::State<'_, AppState>) -> Result<FlashMode, String> {
    let mut scanner = state.scanner.lock().map_err(|e| e.to_string())?;
    let session = scanner.as_mut().ok_or("Scanner is not open.")?;
    Ok(session.toggle_flash())
}

/// Ganti mode barcode/qr. Ditolak selama locked.
#[tauri::command]
pub async fn toggle_scan_mode(state: tauri::State<'_, AppState>) -> Result<ScanType, String> {
    let mut scanner = state.scanner.lock().map_err(|e| e.to_string())?;
    let session = scanner.as_mut().ok_or("Scanner is not open.")?;
    session.toggle_scan_type().map_err(|e| e.to_string())
}

/// Terapkan edit form pada draft. Sebelum percobaan save pertama
/// mengembalikan None (inline error masih disembunyikan), sesudahnya
/// hasil validasi penuh.
#[tauri::command]
pub async fn update_draft(
    state: tauri::State<'_, AppState>,
    edit: DraftEdit,
) -> Result<Option<DraftValidation>, String> {
    let mut scanner = state.scanner.lock().map_err(|e| e.to_string())?;
    let session = scanner.as_mut().ok_or("Scanner is not open.")?;
    session.edit_draft(edit, Utc::now()).map_err(|e| e.to_string())
}

/// Buang draft dan kembali scanning (tombol close di form).
#[tauri::command]
pub async fn discard_draft(state: tauri::State<'_, AppState>) -> Result<ScannerState, String> {
    let mut scanner = state.scanner.lock().map_err(|e| e.to_string())?;
    let session = scanner.as_mut().ok_or("Scanner is not open.")?;
    session.release();
    Ok(ScannerState::snapshot(session))
}

/// Simpan draft jadi card record.
///
/// Menandai percobaan save (validasi inline aktif sejak ini), menolak
/// submit ganda selama round-trip store masih jalan, dan baru melepas
/// lock session setelah store sukses. Saat store gagal draft
/// dipertahankan supaya user tidak kehilangan isian.
#[tauri::command]
pub async fn submit_draft(
    state: tauri::State<'_, AppState>,
    session_token: String,
) -> Result<SubmitOutcome, String> {
    let auth = crate::auth::guard::validate_session(&state, &session_token)?;
    crate::rate_limiter::CREATE_CARD_LIMIT.check(auth.user_id, "CARD_CREATE")?;

    let now = Utc::now();

    // Ambil snapshot draft di dalam lock, lalu lepas sebelum await
    let draft = {
        let mut scanner = state.scanner.lock().map_err(|e| e.to_string())?;
        let session = scanner.as_mut().ok_or("Scanner is not open.")?;
        match session.begin_submit(now).map_err(|e| e.to_string())? {
            SubmitAttempt::Invalid(validation) => {
                return Ok(SubmitOutcome {
                    card: None,
                    errors: Some(validation.errors),
                });
            }
            SubmitAttempt::Ready(draft) => draft,
        }
    };

    // Validasi sudah menjamin angka finite dan tidak negatif
    let reward_amount: f64 = draft
        .reward_detail
        .trim()
        .parse()
        .map_err(|_| "Invalid reward amount.".to_string())?;

    let result =
        crate::commands::card_cmd::insert_card(&state.db, auth.user_id, &draft, reward_amount, now)
            .await;

    // Session bisa saja sudah ditutup oleh navigasi selama round-trip;
    // record yang sudah tersimpan tetap valid.
    let mut scanner = state.scanner.lock().map_err(|e| e.to_string())?;

    match result {
        Ok(card) => {
            if let Some(session) = scanner.as_mut() {
                session.complete_submit();
            }
            drop(scanner);

            crate::commands::activity_cmd::log_activity(
                &state.db,
                Some(auth.user_id),
                "CARD_CREATE",
                &format!("Saved card for vendor {}", card.vendor),
                None,
            )
            .await;

            crate::log_info!(
                "SCANNER",
                "Card saved",
                serde_json::json!({ "card_id": card.id, "user_id": auth.user_id })
            );

            Ok(SubmitOutcome {
                card: Some(CardView::from(card)),
                errors: None,
            })
        }
        Err(err) => {
            if let Some(session) = scanner.as_mut() {
                session.fail_submit();
            }
            drop(scanner);

            Err(crate::errors::sanitize_store_error(
                &err.to_string(),
                "CARD_CREATE",
            ))
        }
    }
}
