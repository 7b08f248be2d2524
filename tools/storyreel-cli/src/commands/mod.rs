pub mod assemble;
pub mod captions;
pub mod check;
pub mod render_scene;
pub mod styles;

use storyreel_render_engine::{ProgressCallback, RenderProgress};

/// Single-line progress printer shared by the long-running commands.
pub(crate) fn progress_printer() -> ProgressCallback {
    Box::new(|p: RenderProgress| {
        print!(
            "\r  Progress: {:.1}% ({}/{} frames, ETA: {:.0}s)  ",
            p.progress * 100.0,
            p.frames_rendered,
            p.total_frames,
            p.eta_secs,
        );
    })
}
