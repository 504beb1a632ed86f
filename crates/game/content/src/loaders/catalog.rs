//! Entity catalog loader.
//!
//! A catalog is either a single RON file ([`CatalogFile`]) or a directory:
//!
//! ```text
//! world_dir/
//! ├── world.ron          # optional CatalogFile: clock, parameters, inline records
//! ├── templates/
//! │   └── poisoned.ron   # one EntityRecord per file
//! └── entities/
//!     ├── rat.ron
//!     └── door.ron
//! ```
//!
//! In directory form each record file is decoded on its own, so a syntax
//! error rejects only that entity.

use std::path::{Path, PathBuf};

use lldm_core::{DecodeError, EngineConfig, EntityRecord, GameTime, LoadReport, Params, World};
use serde::Deserialize;
use tracing::{debug, info};

use crate::loaders::{LoadResult, read_file};

/// World header plus inline records.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct CatalogFile {
    /// World clock in seconds.
    pub clock: u64,
    pub parameters: Params,
    pub templates: Vec<EntityRecord>,
    pub entities: Vec<EntityRecord>,
}

/// Loader for entity catalogs from RON files.
pub struct CatalogLoader;

impl CatalogLoader {
    pub fn parse(content: &str) -> LoadResult<CatalogFile> {
        ron::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse catalog RON: {}", e))
    }

    /// Load a world from a single catalog file.
    pub fn load(path: &Path, config: EngineConfig) -> LoadResult<(World, LoadReport)> {
        let content = read_file(path)?;
        let catalog = Self::parse(&content)?;
        Ok(Self::build(catalog, config))
    }

    /// Load a world from a catalog directory.
    ///
    /// Record files are read in file-name order. Files that fail to decode
    /// are reported as [`DecodeError::Malformed`] under their file stem.
    pub fn load_dir(dir: &Path, config: EngineConfig) -> LoadResult<(World, LoadReport)> {
        let header = dir.join("world.ron");
        let mut catalog = if header.is_file() {
            Self::parse(&read_file(&header)?)?
        } else {
            CatalogFile::default()
        };

        let mut malformed = Vec::new();
        for (stem, content) in read_records(&dir.join("templates"))? {
            match decode_record(&stem, &content) {
                Ok(record) => catalog.templates.push(record),
                Err(err) => malformed.push(err),
            }
        }
        for (stem, content) in read_records(&dir.join("entities"))? {
            match decode_record(&stem, &content) {
                Ok(record) => catalog.entities.push(record),
                Err(err) => malformed.push(err),
            }
        }

        let (world, mut report) = Self::build(catalog, config);
        report.rejected.extend(malformed);
        Ok((world, report))
    }

    /// Builds a world from decoded records. Templates are registered before
    /// entities so initial statuses can refer to them.
    pub fn build(catalog: CatalogFile, config: EngineConfig) -> (World, LoadReport) {
        let mut world = World::with_clock(config, GameTime(catalog.clock));
        world.parameters = catalog.parameters;

        let mut rejected = Vec::new();
        for template in catalog.templates {
            if let Err(err) = world.register_template(template) {
                debug!(target: "lldm::content", error = %err, "template rejected");
                rejected.push(err);
            }
        }

        let mut report = world.load_batch(catalog.entities);
        rejected.append(&mut report.rejected);
        report.rejected = rejected;

        info!(
            target: "lldm::content",
            loaded = report.loaded.len(),
            rejected = report.rejected.len(),
            clock = %world.clock(),
            "catalog loaded"
        );
        (world, report)
    }
}

fn decode_record(stem: &str, content: &str) -> Result<EntityRecord, DecodeError> {
    ron::from_str(content).map_err(|e| DecodeError::Malformed {
        entity: stem.to_owned(),
        message: e.to_string(),
    })
}

/// `.ron` files of `dir` in name order; a missing directory is empty.
fn read_records(dir: &Path) -> LoadResult<Vec<(String, String)>> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }
    let entries = std::fs::read_dir(dir)
        .map_err(|e| anyhow::anyhow!("Failed to read directory {}: {}", dir.display(), e))?;

    let mut paths: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok().map(|entry| entry.path()))
        .filter(|path| path.extension().is_some_and(|ext| ext == "ron"))
        .collect();
    paths.sort();

    paths
        .into_iter()
        .map(|path| {
            let stem = path
                .file_stem()
                .map(|stem| stem.to_string_lossy().into_owned())
                .unwrap_or_default();
            Ok((stem, read_file(&path)?))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use lldm_core::{Frequency, Length, ParamValue, RulesEngine};

    const CATALOG: &str = r#"
(
    clock: 7200,
    parameters: {"open": Flag(true)},
    templates: [
        (name: "poisoned", description: "Venom in the blood."),
    ],
    entities: [
        (
            name: "rat",
            type: "beast",
            hp: (max: 4),
            status: ["poisoned"],
            trigger: [
                (
                    frequency: Hour,
                    length: "*",
                    timestamp: GameTime(7200),
                    action: (
                        type: "gnaw",
                        self: (
                            effects: [
                                (
                                    name: "hunger",
                                    magnitude: Some((base: Value(1))),
                                    operation: Stat(path: "cur_hp", direction: Decrease),
                                ),
                            ],
                        ),
                    ),
                ),
            ],
        ),
        (name: "ghost", hp: (max: 3, cur: Some(9))),
        (name: "rat"),
    ],
)
"#;

    #[test]
    fn rejects_bad_entities_without_aborting() {
        let catalog = CatalogLoader::parse(CATALOG).expect("catalog syntax is valid");
        let (world, report) = CatalogLoader::build(catalog, EngineConfig::default());

        assert_eq!(report.loaded.len(), 1);
        assert_eq!(report.rejected.len(), 2);
        assert!(matches!(
            report.rejected[0],
            DecodeError::VitalOutOfRange { .. }
        ));
        assert!(matches!(
            report.rejected[1],
            DecodeError::DuplicateName { .. }
        ));

        assert_eq!(world.clock(), GameTime(7200));
        assert_eq!(world.parameters.get("open"), Some(&ParamValue::Flag(true)));
        let rat = world.entity_by_name("rat").expect("rat loaded");
        assert_eq!(rat.kind, "beast");
        assert!(rat.statuses.contains("poisoned"));
        assert_eq!(rat.triggers[0].frequency, Frequency::Hour);
        assert_eq!(rat.triggers[0].length, Length::Indefinite);
    }

    #[test]
    fn loaded_triggers_run() {
        let catalog = CatalogLoader::parse(CATALOG).expect("catalog syntax is valid");
        let (mut world, _) = CatalogLoader::build(catalog, EngineConfig::default());
        let rat = world.id_of("rat").expect("rat loaded");

        let fired = RulesEngine::new(&mut world).advance_clock(3600);

        assert_eq!(fired.len(), 1);
        assert!(fired[0].result.is_applied());
        assert_eq!(
            world.entity(rat).expect("rat exists").vitals.hp.current(),
            3
        );
    }

    #[test]
    fn unknown_initial_status_is_rejected() {
        let catalog = CatalogLoader::parse(r#"(entities: [(name: "imp", status: ["cursed"])])"#)
            .expect("catalog syntax is valid");
        let (world, report) = CatalogLoader::build(catalog, EngineConfig::default());

        assert!(world.is_empty());
        assert!(matches!(
            &report.rejected[0],
            DecodeError::UnknownTemplate { template, .. } if template == "cursed"
        ));
    }

    #[test]
    fn broken_syntax_is_a_hard_error() {
        assert!(CatalogLoader::parse("(entities: [(name: \"imp\"").is_err());
    }

    #[test]
    fn directory_isolates_malformed_files() {
        let dir = tempfile::tempdir().expect("temp dir");
        let entities = dir.path().join("entities");
        std::fs::create_dir(&entities).expect("entities dir");
        std::fs::create_dir(dir.path().join("templates")).expect("templates dir");
        std::fs::write(
            dir.path().join("templates").join("stunned.ron"),
            r#"(name: "stunned")"#,
        )
        .expect("write template");
        std::fs::write(
            entities.join("a_guard.ron"),
            r#"(name: "guard", hp: (max: 10), status: ["stunned"])"#,
        )
        .expect("write guard");
        std::fs::write(entities.join("b_broken.ron"), "(name: ").expect("write broken");
        std::fs::write(entities.join("notes.txt"), "ignored").expect("write notes");
        std::fs::write(dir.path().join("world.ron"), "(clock: 60)").expect("write header");

        let (world, report) = CatalogLoader::load_dir(dir.path(), EngineConfig::default())
            .expect("directory readable");

        assert_eq!(world.clock(), GameTime(60));
        assert_eq!(report.loaded.len(), 1);
        assert!(world.entity_by_name("guard").is_some());
        assert!(matches!(
            &report.rejected[..],
            [DecodeError::Malformed { entity, .. }] if entity == "b_broken"
        ));
    }

    #[test]
    fn single_file_round_trip_through_disk() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("catalog.ron");
        std::fs::write(&path, CATALOG).expect("write catalog");

        let (world, report) =
            CatalogLoader::load(&path, EngineConfig::default()).expect("catalog loads");

        assert!(!report.is_clean());
        assert_eq!(world.len(), 1);
        assert!(CatalogLoader::load(&dir.path().join("missing.ron"), EngineConfig::default()).is_err());
    }

    #[test]
    fn rolled_back_invocation_matches_a_no_op_in_the_state_root() {
        const SHRINE: &str = r#"(
            entities: [
                (
                    name: "shrine",
                    interaction: [
                        (
                            type: "bless",
                            target: (
                                effects: [
                                    (
                                        name: "mend",
                                        magnitude: Some((base: Value(3))),
                                        operation: Stat(path: "cur_hp", direction: Increase),
                                    ),
                                    (name: "blessed", operation: Status),
                                ],
                            ),
                        ),
                        (
                            type: "judge",
                            target: (
                                requirements: [Threshold(reference: "target:cur_hp", minimum: 100)],
                            ),
                        ),
                    ],
                ),
                (name: "pilgrim", hp: (max: 10, cur: Some(2))),
            ],
        )"#;
        let load = || {
            let catalog = CatalogLoader::parse(SHRINE).expect("catalog syntax is valid");
            let (world, report) = CatalogLoader::build(catalog, EngineConfig::default());
            assert!(report.is_clean());
            world
        };
        let (mut blessed, mut judged) = (load(), load());
        let shrine = blessed.id_of("shrine").expect("shrine loaded");
        let pilgrim = blessed.id_of("pilgrim").expect("pilgrim loaded");
        let initial = blessed.state_root();

        // `blessed` has no template, so the heal before it is rolled back.
        let aborted = RulesEngine::new(&mut blessed)
            .execute_interaction(shrine, 0, vec![pilgrim])
            .expect("known interaction");
        let refused = RulesEngine::new(&mut judged)
            .execute_interaction(shrine, 1, vec![pilgrim])
            .expect("known interaction");

        assert!(aborted.error().is_some());
        assert!(!refused.is_applied());
        assert_ne!(blessed.state_root(), initial);
        assert_eq!(blessed.state_root(), judged.state_root());
    }
}
