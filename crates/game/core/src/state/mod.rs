//! Authoritative world state.
//!
//! [`World`] owns every entity, the status templates, the world clock and the
//! invocation nonce. Hosts read it freely; mutation goes through
//! [`crate::engine::RulesEngine`].
mod error;
mod record;
pub mod types;

use std::collections::BTreeMap;

use tracing::debug;

pub use error::DecodeError;
pub use record::{EntityRecord, TriggerRecord, VitalRecord, load_entity};
pub use types::*;

use crate::config::EngineConfig;

/// Outcome of a batch load: ids of accepted entities, errors for the rest.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LoadReport {
    pub loaded: Vec<EntityId>,
    pub rejected: Vec<DecodeError>,
}

impl LoadReport {
    pub fn is_clean(&self) -> bool {
        self.rejected.is_empty()
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct World {
    config: EngineConfig,
    clock: GameTime,
    /// Invocation counter, bumped once per interaction or trigger fire.
    nonce: u64,
    next_entity_id: u32,
    entities: BTreeMap<EntityId, Entity>,
    names: BTreeMap<String, EntityId>,
    templates: BTreeMap<String, Entity>,
    /// World-scope parameters readable as `world:parameter.<key>`.
    pub parameters: Params,
}

impl World {
    pub fn new(config: EngineConfig) -> Self {
        Self::with_clock(config, GameTime::ZERO)
    }

    pub fn with_clock(config: EngineConfig, clock: GameTime) -> Self {
        Self {
            config,
            clock,
            nonce: 0,
            next_entity_id: 0,
            entities: BTreeMap::new(),
            names: BTreeMap::new(),
            templates: BTreeMap::new(),
            parameters: Params::new(),
        }
    }

    /// Loads a batch of records. Rejected records are reported, never fatal.
    pub fn load(
        config: EngineConfig,
        records: impl IntoIterator<Item = EntityRecord>,
    ) -> (Self, LoadReport) {
        let mut world = Self::new(config);
        let report = world.load_batch(records);
        (world, report)
    }

    pub fn load_batch(&mut self, records: impl IntoIterator<Item = EntityRecord>) -> LoadReport {
        let mut report = LoadReport::default();
        for record in records {
            match self.load_entity(record) {
                Ok(id) => report.loaded.push(id),
                Err(err) => {
                    debug!(target: "lldm::load", error = %err, "entity rejected");
                    report.rejected.push(err);
                }
            }
        }
        report
    }

    /// Decodes one record and adds it to the world.
    ///
    /// Besides field validation this checks name uniqueness, trigger
    /// timestamps against the clock, initial status templates and the
    /// status limit.
    pub fn load_entity(&mut self, record: EntityRecord) -> Result<EntityId, DecodeError> {
        let initial_statuses = record.status.clone();
        let mut entity = load_entity(record)?;

        for template in initial_statuses {
            let status = self
                .instantiate_status(&template, &template, None)
                .ok_or_else(|| DecodeError::UnknownTemplate {
                    entity: entity.name.clone(),
                    template: template.clone(),
                })?;
            let limit = self.config.max_status_effects;
            if entity.statuses.attach(status, limit) == StatusAttach::Full {
                return Err(DecodeError::StatusLimit {
                    entity: entity.name,
                    template,
                    limit,
                });
            }
        }

        self.spawn(entity)
    }

    /// Adds an already built entity, assigning its id.
    pub fn spawn(&mut self, mut entity: Entity) -> Result<EntityId, DecodeError> {
        if self.names.contains_key(&entity.name) {
            return Err(DecodeError::DuplicateName {
                entity: entity.name,
            });
        }
        if let Some((index, trigger)) = entity
            .triggers
            .iter()
            .enumerate()
            .find(|(_, trigger)| trigger.timestamp > self.clock)
        {
            return Err(DecodeError::TimestampAhead {
                entity: entity.name.clone(),
                index,
                timestamp: trigger.timestamp,
                clock: self.clock,
            });
        }

        let id = EntityId(self.next_entity_id);
        self.next_entity_id += 1;
        entity.id = id;
        self.names.insert(entity.name.clone(), id);
        self.entities.insert(id, entity);
        Ok(id)
    }

    /// Registers a status template. Templates are not world entities.
    pub fn register_template(&mut self, record: EntityRecord) -> Result<(), DecodeError> {
        let template = load_entity(record)?;
        self.templates.insert(template.name.clone(), template);
        Ok(())
    }

    pub fn template(&self, name: &str) -> Option<&Entity> {
        self.templates.get(name)
    }

    /// Builds a status sub-entity from a registered template.
    pub(crate) fn instantiate_status(
        &self,
        tag: &str,
        template: &str,
        expires_at: Option<GameTime>,
    ) -> Option<StatusInstance> {
        let entity = self.templates.get(template)?.clone();
        Some(StatusInstance {
            tag: tag.to_owned(),
            template: template.to_owned(),
            applied_at: self.clock,
            expires_at,
            entity: Box::new(entity),
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn clock(&self) -> GameTime {
        self.clock
    }

    pub fn nonce(&self) -> u64 {
        self.nonce
    }

    pub fn entity(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(&id)
    }

    pub fn id_of(&self, name: &str) -> Option<EntityId> {
        self.names.get(name).copied()
    }

    pub fn entity_by_name(&self, name: &str) -> Option<&Entity> {
        self.id_of(name).and_then(|id| self.entity(id))
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.entities.contains_key(&id)
    }

    /// Entities in id order.
    pub fn entities(&self) -> impl Iterator<Item = &Entity> {
        self.entities.values()
    }

    pub fn ids(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.entities.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub(crate) fn entity_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.get_mut(&id)
    }

    pub(crate) fn entities_mut(&mut self) -> impl Iterator<Item = &mut Entity> {
        self.entities.values_mut()
    }

    /// Puts back a pre-image captured before a failed invocation.
    pub(crate) fn restore(&mut self, entity: Entity) {
        self.entities.insert(entity.id, entity);
    }

    pub(crate) fn set_clock(&mut self, clock: GameTime) {
        self.clock = clock;
    }

    /// Consumes and returns the next invocation nonce.
    pub(crate) fn next_nonce(&mut self) -> u64 {
        let nonce = self.nonce;
        self.nonce = self.nonce.wrapping_add(1);
        nonce
    }

    /// SHA-256 commitment over the clock, nonce and every entity in id order.
    ///
    /// Two worlds with equal roots are byte-identical under bincode, which is
    /// how tests and hosts check that a rolled-back invocation left no trace.
    #[cfg(feature = "serde")]
    pub fn state_root(&self) -> [u8; 32] {
        use sha2::{Digest, Sha256};

        let mut hasher = Sha256::new();
        hasher.update(self.clock.0.to_le_bytes());
        hasher.update(self.nonce.to_le_bytes());
        for entity in self.entities.values() {
            if let Ok(bytes) = bincode::serialize(entity) {
                hasher.update(&bytes);
            }
        }
        hasher.finalize().into()
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn batch_load_reports_rejections_and_keeps_the_rest() {
        let mut bad = EntityRecord::named("ghost");
        bad.hp = VitalRecord {
            max: 1,
            cur: Some(3),
        };
        let records = vec![
            EntityRecord::named("alice"),
            bad,
            EntityRecord::named("alice"),
            EntityRecord::named("bob"),
        ];

        let (world, report) = World::load(EngineConfig::default(), records);

        assert_eq!(report.loaded, vec![EntityId(0), EntityId(1)]);
        assert_eq!(report.rejected.len(), 2);
        assert!(matches!(report.rejected[0], DecodeError::VitalOutOfRange { .. }));
        assert!(matches!(report.rejected[1], DecodeError::DuplicateName { .. }));
        assert_eq!(world.id_of("bob"), Some(EntityId(1)));
        assert_eq!(world.len(), 2);
    }

    #[test]
    fn initial_statuses_need_registered_templates() {
        let mut world = World::default();
        world
            .register_template(EntityRecord::named("blessed"))
            .unwrap();

        let mut record = EntityRecord::named("priest");
        record.status = vec!["blessed".into()];
        let id = world.load_entity(record).unwrap();
        assert!(world.entity(id).unwrap().statuses.contains("blessed"));

        let mut record = EntityRecord::named("heretic");
        record.status = vec!["cursed".into()];
        assert!(matches!(
            world.load_entity(record),
            Err(DecodeError::UnknownTemplate { .. })
        ));
    }

    #[test]
    fn statuses_beyond_the_limit_reject_the_record() {
        let config = EngineConfig {
            max_status_effects: 1,
            ..EngineConfig::default()
        };
        let mut world = World::new(config);
        for template in ["dazed", "prone"] {
            world
                .register_template(EntityRecord::named(template))
                .unwrap();
        }

        let mut record = EntityRecord::named("brawler");
        record.status = vec!["dazed".into(), "prone".into()];
        let report = world.load_batch([record]);

        assert!(report.loaded.is_empty());
        assert_eq!(
            report.rejected,
            vec![DecodeError::StatusLimit {
                entity: "brawler".into(),
                template: "prone".into(),
                limit: 1,
            }]
        );
        assert!(world.is_empty());
    }

    #[test]
    fn trigger_timestamp_cannot_lead_the_clock() {
        let mut world = World::with_clock(EngineConfig::default(), GameTime(100));
        let mut record = EntityRecord::named("bell");
        record.trigger.push(TriggerRecord {
            frequency: Frequency::Hour,
            length: Length::Indefinite,
            timestamp: GameTime(500),
            retry_on_fail: false,
            action: Default::default(),
        });
        assert!(matches!(
            world.load_entity(record),
            Err(DecodeError::TimestampAhead { .. })
        ));
    }

    #[test]
    fn nonce_increments() {
        let mut world = World::default();
        assert_eq!(world.next_nonce(), 0);
        assert_eq!(world.next_nonce(), 1);
        assert_eq!(world.nonce(), 2);
    }
}
