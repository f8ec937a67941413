use std::path::Path;
use std::sync::Arc;
use toml_edit::{Array, DocumentMut, Item, Table, Value};

/// Migrates config file to latest format if needed
pub async fn migrate_config_if_needed<P: AsRef<Path>>(
    path: P,
    events: Option<&Arc<imgvault_events::EventBus>>,
) -> anyhow::Result<()> {
    let content = tokio::fs::read_to_string(path.as_ref()).await?;
    let mut doc = content.parse::<DocumentMut>()?;
    let added_fields = migrate_document(&mut doc)?;

    // Only write if something changed
    if !added_fields.is_empty() {
        tokio::fs::write(path.as_ref(), doc.to_string()).await?;

        if let Some(event_bus) = events {
            event_bus.emit(imgvault_events::AppEvent::ConfigMigrated {
                added_fields: added_fields.clone(),
            });
        }
    }

    Ok(())
}

/// Applies every migration step in place and lists what changed
pub(crate) fn migrate_document(doc: &mut DocumentMut) -> anyhow::Result<Vec<String>> {
    let mut added_fields = Vec::new();

    migrate_server_section(doc, &mut added_fields)?;
    migrate_security_section(doc, &mut added_fields)?;
    migrate_storage_section(doc, &mut added_fields)?;

    Ok(added_fields)
}

fn migrate_server_section(
    doc: &mut DocumentMut,
    added_fields: &mut Vec<String>,
) -> anyhow::Result<()> {
    ensure_table(doc.as_table_mut(), "server", added_fields);

    let server = doc["server"]
        .as_table_mut()
        .ok_or_else(|| anyhow::anyhow!("Invalid [server] section in config"))?;
    ensure_field(server, "host", Value::from("0.0.0.0"), added_fields);
    ensure_field(server, "port", Value::from(3000), added_fields);
    ensure_field(
        server,
        "base_url",
        Value::from("http://localhost:3000"),
        added_fields,
    );
    ensure_field(server, "tcp_nodelay", Value::from(true), added_fields);
    ensure_field(server, "timeout_secs", Value::from(60), added_fields);
    ensure_field(server, "max_body_size_mb", Value::from(10), added_fields);
    ensure_field(
        server,
        "streaming_threshold_mb",
        Value::from(8),
        added_fields,
    );
    ensure_field(
        server,
        "enable_compression",
        Value::from(true),
        added_fields,
    );

    if !server.contains_key("allowed_origins") {
        let mut arr = Array::new();
        arr.push("*");
        server["allowed_origins"] = Item::Value(Value::Array(arr));
        added_fields.push("server.allowed_origins".to_string());
    }

    Ok(())
}

fn migrate_security_section(
    doc: &mut DocumentMut,
    added_fields: &mut Vec<String>,
) -> anyhow::Result<()> {
    ensure_table(doc.as_table_mut(), "security", added_fields);

    let security = doc["security"]
        .as_table_mut()
        .ok_or_else(|| anyhow::anyhow!("Invalid [security] section in config"))?;

    // Older files called the token secret jwt_secret
    if let Some(old_secret) = security.remove("jwt_secret") {
        if !security.contains_key("signing_secret") {
            security.insert("signing_secret", old_secret);
        }
        added_fields.push("security.signing_secret (migrated from jwt_secret)".to_string());
    }

    ensure_field(security, "api_key", Value::from(""), added_fields);
    ensure_field(
        security,
        "signing_secret",
        Value::from(super::defaults::PLACEHOLDER_SIGNING_SECRET),
        added_fields,
    );

    Ok(())
}

fn migrate_storage_section(
    doc: &mut DocumentMut,
    added_fields: &mut Vec<String>,
) -> anyhow::Result<()> {
    ensure_table(doc.as_table_mut(), "storage", added_fields);

    let storage = doc["storage"]
        .as_table_mut()
        .ok_or_else(|| anyhow::anyhow!("Invalid [storage] section in config"))?;

    // Deprecated storage.strategy -> storage.backend
    if let Some(strategy) = storage.remove("strategy") {
        if !storage.contains_key("backend") {
            storage.insert("backend", strategy);
        }
        added_fields.push("storage.backend (migrated from strategy)".to_string());
    }

    // Deprecated boolean storage.temp_storage -> storage.retention
    if let Some(temp_storage) = storage.remove("temp_storage") {
        if !storage.contains_key("retention") {
            let temporary = temp_storage.as_bool().unwrap_or(false);
            let mode = if temporary { "temporary" } else { "permanent" };
            storage.insert("retention", Item::Value(Value::from(mode)));
        }
        added_fields.push("storage.retention (migrated from temp_storage)".to_string());
    }

    ensure_field(storage, "backend", Value::from("local"), added_fields);
    ensure_field(storage, "retention", Value::from("permanent"), added_fields);
    ensure_field(storage, "url_expiration_secs", Value::from(3600), added_fields);
    ensure_field(storage, "timestamp_prefix", Value::from(true), added_fields);

    ensure_table(storage, "local", added_fields);
    let local = storage["local"]
        .as_table_mut()
        .ok_or_else(|| anyhow::anyhow!("Invalid [storage.local] section in config"))?;
    ensure_field(local, "permanent_dir", Value::from("uploads/permanent"), added_fields);
    ensure_field(local, "temp_dir", Value::from("uploads/temp"), added_fields);

    ensure_table(storage, "s3", added_fields);
    let s3 = storage["s3"]
        .as_table_mut()
        .ok_or_else(|| anyhow::anyhow!("Invalid [storage.s3] section in config"))?;
    ensure_field(s3, "endpoint_url", Value::from(""), added_fields);
    ensure_field(s3, "region", Value::from("us-east-1"), added_fields);
    ensure_field(s3, "access_key_id", Value::from(""), added_fields);
    ensure_field(s3, "secret_access_key", Value::from(""), added_fields);
    ensure_field(s3, "bucket_name", Value::from(""), added_fields);
    ensure_field(s3, "permanent_prefix", Value::from("permanent/"), added_fields);
    ensure_field(s3, "temp_prefix", Value::from("temp/"), added_fields);

    Ok(())
}

fn ensure_table(parent: &mut Table, key: &str, added_fields: &mut Vec<String>) {
    if !parent.contains_key(key) {
        let mut table = Table::new();
        table.set_implicit(true);
        parent.insert(key, Item::Table(table));
        added_fields.push(key.to_string());
    }
}

fn ensure_field(
    table: &mut Table,
    key: &str,
    default_value: Value,
    added_fields: &mut Vec<String>,
) {
    if !table.contains_key(key) {
        table[key] = Item::Value(default_value);
        added_fields.push(key.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::defaults::DEFAULT_CONFIG_TEMPLATE;
    use crate::models::{Config, RetentionMode};
    use tempfile::tempdir;

    #[test]
    fn template_needs_no_migration() {
        let mut doc = DEFAULT_CONFIG_TEMPLATE.parse::<DocumentMut>().unwrap();
        assert!(migrate_document(&mut doc).unwrap().is_empty());
    }

    #[test]
    fn missing_sections_are_filled_with_defaults() {
        let mut doc = "[server]\nport = 8080\n".parse::<DocumentMut>().unwrap();

        let added = migrate_document(&mut doc).unwrap();
        let config: Config = toml::from_str(&doc.to_string()).unwrap();

        assert!(added.contains(&"security".to_string()));
        assert!(added.contains(&"storage".to_string()));
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.storage.local.permanent_dir, "uploads/permanent");
        assert_eq!(config.storage.s3.permanent_prefix, "permanent/");
    }

    #[test]
    fn deprecated_storage_fields_are_renamed() {
        let source = "[server]\nhost = \"127.0.0.1\"\n\n[storage]\nstrategy = \"remote\"\ntemp_storage = true\n\n[security]\njwt_secret = \"old\"\n";
        let mut doc = source.parse::<DocumentMut>().unwrap();

        migrate_document(&mut doc).unwrap();
        let config: Config = toml::from_str(&doc.to_string()).unwrap();

        assert_eq!(config.storage.backend, crate::BackendKind::Remote);
        assert_eq!(config.storage.retention, RetentionMode::Temporary);
        assert_eq!(config.security.signing_secret, "old");
        assert!(!doc.to_string().contains("temp_storage"));
        assert!(!doc.to_string().contains("jwt_secret"));
    }

    #[tokio::test]
    async fn migration_rewrites_file_only_when_needed() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");

        tokio::fs::write(&path, DEFAULT_CONFIG_TEMPLATE).await.unwrap();
        migrate_config_if_needed(&path, None).await.unwrap();
        assert_eq!(tokio::fs::read_to_string(&path).await.unwrap(), DEFAULT_CONFIG_TEMPLATE);

        tokio::fs::write(&path, "[server]\nport = 1\n").await.unwrap();
        migrate_config_if_needed(&path, None).await.unwrap();
        let migrated = tokio::fs::read_to_string(&path).await.unwrap();
        assert!(migrated.contains("permanent_dir"));
        assert!(migrated.contains("signing_secret"));
    }
}
