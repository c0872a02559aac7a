use rodio::{OutputStream, OutputStreamHandle};
use tracing::{info, warn};

use super::utils::output_device;

/// Opens the audio output. The returned stream must stay alive, on the thread
/// that created it, for as long as anything plays.
pub fn init() -> color_eyre::Result<(OutputStream, OutputStreamHandle)> {
    if let Some((device, name)) = output_device() {
        match OutputStream::try_from_device(&device) {
            Ok(output) => {
                info!("Audio output: {name}");
                return Ok(output);
            }
            Err(e) => warn!("Can't open '{name}', using the default: {e}"),
        }
    }

    Ok(OutputStream::try_default()?)
}
