//! `discovery.sh`, the script started by the discovery server service

use crate::defaults;
use crate::models::{DiscoveryConf, ExportConf, ExportKey};

/// Render the launcher for the local discovery server
///
/// The last line has no terminator.
pub fn render(export: &ExportConf, discovery: &DiscoveryConf) -> String {
    let workspace = export
        .get(ExportKey::Workspace)
        .unwrap_or(defaults::DEFAULT_WORKSPACE_SETUP);

    format!(
        "#!/bin/bash\n{}\n\nsource {}\nfastdds discovery -i {} -p {}",
        defaults::GENERATED_FILE_NOTICE,
        workspace,
        discovery.server_id,
        discovery.port,
    )
}
