//! Sequencing of reads and writes across the codecs
//!
//! Reads go system → Wi-Fi → export → discovery because the discovery view
//! is decoded from an export value. Writes go system → Wi-Fi → discovery →
//! export because preparing discovery rewrites export values.
//!
//! A read builds a fresh model and only replaces the current one when every
//! source was read. A write renders every file in memory before replacing
//! any of them; a failure after the first replacement is reported as an
//! incomplete write and earlier files are left as written.

use crate::codec::{self, discovery, export, launcher, netplan, system, Topology, WifiFields};
use crate::defaults;
use crate::error::{AppError, ErrorContext, Result};
use crate::logging::Logger;
use crate::models::{
    Category, ConfigKey, ConfigModel, ConfigPaths, ConfigValue, ExportKey, SetOutcome, Settings,
};
use crate::types::{FileKind, PendingWrite};

/// Owns the configuration model and keeps it in sync with the files
pub struct ConfigOrchestrator {
    model: ConfigModel,
    paths: ConfigPaths,
    logger: Logger,
    detect_ip: bool,
}

impl ConfigOrchestrator {
    pub fn new(paths: ConfigPaths, logger: Logger) -> Self {
        Self {
            model: ConfigModel::new(),
            paths,
            logger,
            detect_ip: true,
        }
    }

    pub fn from_settings(settings: &Settings, logger: Logger) -> Self {
        Self::new(settings.paths(), logger)
    }

    /// Enable or disable asking `hostname -I` for the current address
    pub fn with_ip_detection(mut self, enabled: bool) -> Self {
        self.detect_ip = enabled;
        self
    }

    pub fn model(&self) -> &ConfigModel {
        &self.model
    }

    pub fn model_mut(&mut self) -> &mut ConfigModel {
        &mut self.model
    }

    pub fn paths(&self) -> &ConfigPaths {
        &self.paths
    }

    /// Load every category from disk
    ///
    /// Missing or malformed sources leave their fields at the defaults. Any
    /// other failure is fatal and the current model is kept untouched.
    pub fn read(&mut self) -> Result<()> {
        let correlation_id = self.logger.start_operation("read");
        let mut model = ConfigModel::new();

        let result = self
            .read_system(&mut model)
            .and_then(|_| self.read_wifi(&mut model))
            .and_then(|_| self.read_export(&mut model))
            .map(|_| self.read_discovery(&mut model));

        self.logger.end_operation(&correlation_id, "read", result.is_ok());
        match result {
            Ok(()) => {
                export::apply_to_process_env(&model.export.entries());
                self.model = model;
                Ok(())
            }
            Err(e) => {
                crate::log_error!(self.logger, "Reading configuration failed: {}", e);
                Err(AppError::read_failed(e.to_string()))
            }
        }
    }

    /// Apply a soft-failing read result, falling back to defaults
    fn soft<T>(&self, category: &str, result: Result<T>) -> Result<Option<T>> {
        match result {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.is_soft() => {
                self.logger.fallback(category, &e);
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    fn read_system(&self, model: &mut ConfigModel) -> Result<()> {
        let fields = self.soft("system", system::read(&self.paths.system_file))?;
        self.logger.file_read(FileKind::System, &self.paths.system_file, fields.is_some());
        if let Some(fields) = fields {
            fields.apply_to(&mut model.system);
        }

        let hostname = self.soft("hostname", system::read_hostname(&self.paths.hostname_file))?;
        self.logger.file_read(FileKind::Hostname, &self.paths.hostname_file, hostname.is_some());
        if let Some(Some(hostname)) = hostname {
            model.system.hostname = hostname;
        }

        if self.detect_ip {
            model.system.ip = system::detect_ip();
        }
        Ok(())
    }

    fn read_wifi(&self, model: &mut ConfigModel) -> Result<()> {
        let parsed = self.soft("wifi", netplan::read_lenient(&self.paths.netplan_wifis_file))?;
        let (fields, fallbacks) = parsed.unwrap_or_default();
        self.logger.file_read(FileKind::Netplan, &self.paths.netplan_wifis_file, fields.is_some());
        for error in &fallbacks {
            self.logger.fallback("wifi field", error);
        }
        if let Some(fields) = fields {
            fields.apply_to(&mut model.wifi);
        }
        Ok(())
    }

    fn read_export(&self, model: &mut ConfigModel) -> Result<()> {
        let mapping = self.soft("export", export::read(&self.paths.setup_bash_file))?;
        self.logger.file_read(FileKind::Export, &self.paths.setup_bash_file, mapping.is_some());
        for (key, value) in mapping.into_iter().flatten() {
            model.export.set(key, value);
        }
        Ok(())
    }

    fn read_discovery(&self, model: &mut ConfigModel) {
        let Some(raw) = model.export.discovery_server().map(str::to_string) else {
            model.discovery.enabled = false;
            return;
        };

        match discovery::decode(&raw) {
            Ok(topology) => topology.apply_to(&mut model.discovery),
            Err(e) => {
                self.logger.fallback("discovery", &e);
                model.apply_default(Category::Discovery);
            }
        }
    }

    /// Persist every category
    pub fn write(&mut self) -> Result<()> {
        let correlation_id = self.logger.start_operation("write");
        let result = self.plan_write().and_then(|writes| self.commit(&writes));
        self.logger.end_operation(&correlation_id, "write", result.is_ok());
        result
    }

    /// Persist only the discovery launcher and the export file
    pub fn write_discovery(&mut self) -> Result<()> {
        let correlation_id = self.logger.start_operation("write_discovery");
        let result = self.plan_discovery().and_then(|writes| self.commit(&writes));
        self.logger.end_operation(&correlation_id, "write_discovery", result.is_ok());
        result
    }

    /// Render every file in commit order without touching the disk
    pub fn plan_write(&mut self) -> Result<Vec<PendingWrite>> {
        self.plan_all()
            .map_err(|e| AppError::write_incomplete(format!("nothing was written: {}", e)))
    }

    /// Render the discovery launcher and export file without touching the disk
    pub fn plan_discovery(&mut self) -> Result<Vec<PendingWrite>> {
        self.plan_discovery_write()
            .map_err(|e| AppError::write_incomplete(format!("nothing was written: {}", e)))
    }

    fn plan_all(&mut self) -> Result<Vec<PendingWrite>> {
        let existing_system = codec::read_optional(&self.paths.system_file)?.unwrap_or_default();
        let mut writes = vec![
            PendingWrite::new(
                FileKind::System,
                &self.paths.system_file,
                system::render(&existing_system, &self.model.system),
            ),
            PendingWrite::new(
                FileKind::Hostname,
                &self.paths.hostname_file,
                system::render_hostname(&self.model.system),
            ),
            PendingWrite::new(
                FileKind::Netplan,
                &self.paths.netplan_wifis_file,
                netplan::render(&WifiFields::from(&self.model.wifi))
                    .context("Failed to render the Wi-Fi configuration")?,
            ),
        ];
        writes.extend(self.plan_discovery_write()?);
        Ok(writes)
    }

    fn plan_discovery_write(&mut self) -> Result<Vec<PendingWrite>> {
        let mut writes: Vec<PendingWrite> = self.prepare_discovery().into_iter().collect();

        let existing = codec::read_optional(&self.paths.setup_bash_file)?.unwrap_or_default();
        writes.push(PendingWrite::new(
            FileKind::Export,
            &self.paths.setup_bash_file,
            export::render(&existing, &self.model.export.entries())
                .with_context(|| format!("Failed to update '{}'", self.paths.setup_bash_file.display()))?,
        ));
        Ok(writes)
    }

    /// Fold the discovery view back into the export values
    ///
    /// Returns the launcher script to write when discovery is enabled.
    fn prepare_discovery(&mut self) -> Option<PendingWrite> {
        let export = &mut self.model.export;

        if !self.model.discovery.enabled {
            export.set(ExportKey::DiscoveryServer, None);
            export.set(ExportKey::SuperClient, Some(defaults::FALSE_LITERAL.to_string()));
            return None;
        }

        let raw = discovery::encode(&Topology::from(&self.model.discovery));
        export.set(ExportKey::DiscoveryServer, Some(raw));
        export.set(ExportKey::Rmw, Some(defaults::RMW_FASTRTPS.to_string()));
        export.set(ExportKey::SuperClient, Some(defaults::TRUE_LITERAL.to_string()));

        Some(PendingWrite::new(
            FileKind::Launcher,
            &self.paths.discovery_sh_file,
            launcher::render(&self.model.export, &self.model.discovery),
        ))
    }

    /// Replace the files one by one in the given order
    pub fn commit(&self, writes: &[PendingWrite]) -> Result<()> {
        for (done, write) in writes.iter().enumerate() {
            let result = match write.kind {
                FileKind::Launcher => codec::write_executable(&write.path, &write.contents),
                _ => codec::write_atomic(&write.path, &write.contents),
            };

            if let Err(e) = result {
                self.logger.error(&format!("Failed to write {}", write.kind))
                    .location(file!(), line!(), Some(module_path!()))
                    .field("path", write.path.display().to_string())
                    .field("committed", done)
                    .field("pending", writes.len() - done)
                    .error_info(&e)
                    .log();
                return Err(AppError::write_incomplete(format!(
                    "{} ({} of {} files written)",
                    e,
                    done,
                    writes.len()
                )));
            }

            self.logger.file_committed(write.kind, &write.path, write.contents.len());
            if write.kind == FileKind::Export {
                export::apply_to_process_env(&self.model.export.entries());
            }
        }
        Ok(())
    }

    pub fn get(&self, key: impl Into<ConfigKey>) -> ConfigValue {
        self.model.get(key)
    }

    /// Update one field, logging clamps and rejections
    pub fn set(&mut self, key: impl Into<ConfigKey>, value: impl Into<ConfigValue>) -> Result<SetOutcome> {
        let key = key.into();
        let outcome = self.model.set(key, value)?;
        match &outcome {
            SetOutcome::Applied => crate::log_debug!(self.logger, "Set {}", key),
            SetOutcome::Clamped { requested, stored } => {
                crate::log_warn!(self.logger, "{} clamped from {} to {}", key, requested, stored)
            }
            SetOutcome::Rejected(reason) => crate::log_warn!(self.logger, "{} left unchanged: {}", key, reason),
        }
        Ok(outcome)
    }

    pub fn apply_default(&mut self, category: Category) {
        crate::log_info!(self.logger, "Restoring default {} configuration", category);
        self.model.apply_default(category);
    }

    /// Discovery server list for the current model
    pub fn discovery_str(&self) -> String {
        discovery::encode(&Topology::from(&self.model.discovery))
    }

    /// Server list for the Create 3 base
    pub fn create3_server_str(&self) -> String {
        discovery::create3_server_str(self.model.discovery.server_id, self.model.discovery.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DiscoveryKey, SystemKey, WifiKey, WifiMode};
    use std::fs;
    use tempfile::TempDir;

    fn orchestrator(dir: &TempDir) -> ConfigOrchestrator {
        let settings = Settings::rooted_at(dir.path());
        ConfigOrchestrator::from_settings(&settings, Logger::quiet("TEST")).with_ip_detection(false)
    }

    #[test]
    fn test_read_with_no_files_keeps_defaults() {
        let dir = TempDir::new().unwrap();
        let mut orch = orchestrator(&dir);
        orch.read().unwrap();
        assert_eq!(orch.model(), &ConfigModel::default());
    }

    #[test]
    fn test_read_io_failure_is_fatal() {
        let dir = TempDir::new().unwrap();
        // A file where the setup directory should be
        fs::write(dir.path().join("turtlebot4"), "").unwrap();

        let mut orch = orchestrator(&dir);
        orch.set(SystemKey::Hostname, "before").unwrap();
        let err = orch.read().unwrap_err();
        assert!(matches!(err, AppError::ReadFailed(_)));
        assert_eq!(orch.model().system.hostname, "before");
    }

    #[test]
    fn test_corrupt_discovery_falls_back_to_defaults() {
        let dir = TempDir::new().unwrap();
        let setup = dir.path().join("turtlebot4");
        fs::create_dir_all(&setup).unwrap();
        fs::write(
            setup.join("setup.bash"),
            "export ROS_DISCOVERY_SERVER=\"127.0.0.1:11811;127.0.0.1:11812;\"\nexport ROS_DOMAIN_ID=\"5\"\n",
        )
        .unwrap();

        let mut orch = orchestrator(&dir);
        orch.read().unwrap();
        assert!(!orch.model().discovery.enabled);
        assert_eq!(orch.model().discovery, crate::models::DiscoveryConf::default());
        assert_eq!(orch.get(ExportKey::DomainId), ConfigValue::from("5"));
    }

    #[test]
    fn test_write_then_read_round_trip() {
        let dir = TempDir::new().unwrap();
        let mut orch = orchestrator(&dir);
        orch.set(SystemKey::Hostname, "robot-7").unwrap();
        orch.set(WifiKey::WifiMode, "Client").unwrap();
        orch.set(WifiKey::Ssid, "Lab").unwrap();
        orch.set(DiscoveryKey::Enabled, true).unwrap();
        orch.set(DiscoveryKey::OffboardIp, "10.0.0.5").unwrap();
        orch.set(DiscoveryKey::OffboardId, 2).unwrap();
        orch.write().unwrap();

        let mut reread = orchestrator(&dir);
        reread.read().unwrap();
        let model = reread.model();
        assert_eq!(model.system.hostname, "robot-7");
        assert_eq!(model.wifi.ssid, "Lab");
        assert_eq!(model.wifi.mode, WifiMode::Client);
        assert!(model.discovery.enabled);
        assert_eq!(model.discovery.offboard_id, 2);
        assert_eq!(
            model.export.discovery_server(),
            Some("127.0.0.1:11811;;10.0.0.5:11811;")
        );
        assert!(model.export.super_client());

        let script = fs::read_to_string(&reread.paths().discovery_sh_file).unwrap();
        assert!(script.contains("fastdds discovery -i 0 -p 11811"));
    }

    #[test]
    fn test_disabling_discovery_clears_export() {
        let dir = TempDir::new().unwrap();
        let mut orch = orchestrator(&dir);
        orch.set(DiscoveryKey::Enabled, true).unwrap();
        orch.write_discovery().unwrap();
        assert!(orch.model().export.super_client());

        orch.set(DiscoveryKey::Enabled, false).unwrap();
        orch.write_discovery().unwrap();
        assert_eq!(orch.model().export.discovery_server(), None);
        assert!(!orch.model().export.super_client());
        let bash = fs::read_to_string(&orch.paths().setup_bash_file).unwrap();
        assert!(bash.contains("export ROS_DISCOVERY_SERVER=\"\""));
        assert!(bash.contains("export ROS_SUPER_CLIENT=\"False\""));
    }

    #[test]
    fn test_write_failure_is_incomplete() {
        let dir = TempDir::new().unwrap();
        // A file where the netplan directory should be
        fs::write(dir.path().join("netplan"), "").unwrap();

        let mut orch = orchestrator(&dir);
        let err = orch.write().unwrap_err();
        assert!(matches!(err, AppError::WriteIncomplete(_)));
        assert!(err.to_string().contains("2 of 4 files written"));
        // Files before the failure stay written
        assert!(orch.paths().system_file.exists());
        assert!(!orch.paths().setup_bash_file.exists());
    }

    #[test]
    fn test_unknown_band_keeps_access_point_through_write() {
        let dir = TempDir::new().unwrap();
        let netplan_dir = dir.path().join("netplan");
        fs::create_dir_all(&netplan_dir).unwrap();
        fs::write(
            netplan_dir.join("50-wifis.yaml"),
            "network:\n  wifis:\n    wlan0:\n      dhcp4: yes\n      access-points:\n        LabNet:\n          password: hunter22\n          band: 6GHz\n",
        )
        .unwrap();

        let mut orch = orchestrator(&dir);
        orch.read().unwrap();
        assert_eq!(orch.model().wifi.ssid, "LabNet");
        assert_eq!(orch.model().wifi.password.as_deref(), Some("hunter22"));
        assert!(orch.model().wifi.dhcp);

        orch.set(ExportKey::DomainId, 5).unwrap();
        orch.write().unwrap();

        let yaml = fs::read_to_string(&orch.paths().netplan_wifis_file).unwrap();
        assert!(yaml.contains("LabNet"));
        assert!(yaml.contains("hunter22"));
        assert!(yaml.contains("dhcp4: true"));
        assert!(!yaml.contains("Turtlebot4"));
    }

    #[test]
    fn test_discovery_plan_matches_discovery_write() {
        let dir = TempDir::new().unwrap();
        let mut orch = orchestrator(&dir);
        orch.set(DiscoveryKey::Enabled, true).unwrap();

        let kinds: Vec<FileKind> = orch.plan_discovery().unwrap().iter().map(|w| w.kind).collect();
        assert_eq!(kinds, vec![FileKind::Launcher, FileKind::Export]);
        assert!(!orch.paths().setup_bash_file.exists());

        orch.set(DiscoveryKey::Enabled, false).unwrap();
        let kinds: Vec<FileKind> = orch.plan_discovery().unwrap().iter().map(|w| w.kind).collect();
        assert_eq!(kinds, vec![FileKind::Export]);
    }

    #[test]
    fn test_companion_strings() {
        let dir = TempDir::new().unwrap();
        let mut orch = orchestrator(&dir);
        orch.set(DiscoveryKey::ServerId, 2).unwrap();
        orch.set(DiscoveryKey::Port, 11900).unwrap();
        assert_eq!(orch.discovery_str(), ";;127.0.0.1:11900;");
        assert_eq!(orch.create3_server_str(), ";;192.168.186.3:11900");
    }
}
