//! Save/load of the reptile collection.
//!
//! `reptile_data` is a fixed-width header followed by one fixed-size
//! record per reptile:
//!
//!   header v2: version u32 | timestamp u64 | reptile_count u16 | checksum u32
//!   header v1: version u32 | timestamp u32 | reptile_count u16 | checksum u32
//!
//! Header and records are bincode with fixed-int little-endian encoding,
//! so every record has the same size. The checksum covers the records only.
//!
//! RULE: A stored version above `CURRENT_SAVE_VERSION` is refused before
//! anything else is looked at. Older versions are upgraded in memory.

use crate::{
    error::{IntegrityError, SimError, SimResult, StorageError},
    reptile::{truncate_name, Behavior, HabitatState, HealthState, LifeStage, Reptile},
    species::{get_species_data, SpeciesId},
    store::KvStore,
    types::Timestamp,
};
use serde::{Deserialize, Serialize};
use std::time::Instant;

/// Version written by `save`. Increment when the record layout changes.
pub const CURRENT_SAVE_VERSION: u32 = 2;

/// Most reptiles a stored record may declare.
pub const MAX_SAVED_REPTILES: usize = 10;

pub const KEY_SAVE_VERSION: &str = "save_version";
pub const KEY_LAST_SAVE_TIME: &str = "last_save_time";
pub const KEY_REPTILE_COUNT: &str = "reptile_count";
pub const KEY_REPTILE_DATA: &str = "reptile_data";

const PRIMARY_KEYS: [&str; 4] = [
    KEY_SAVE_VERSION,
    KEY_LAST_SAVE_TIME,
    KEY_REPTILE_COUNT,
    KEY_REPTILE_DATA,
];

const NAME_FIELD_LEN: usize = 32;

pub fn backup_key(key: &str) -> String {
    format!("{key}_backup")
}

/// Rotating XOR over the payload. Bits leaving the top re-enter at the
/// bottom, so a change to any single byte changes the result.
pub fn checksum(data: &[u8]) -> u32 {
    data.iter().fold(0u32, |csum, &b| csum.rotate_left(1) ^ b as u32)
}

// ── Wire structs ─────────────────────────────────────────────────

#[derive(Debug, Serialize, Deserialize)]
struct HeaderV1 {
    version:       u32,
    timestamp:     u32,
    reptile_count: u16,
    checksum:      u32,
}

#[derive(Debug, Serialize, Deserialize)]
struct HeaderV2 {
    version:       u32,
    timestamp:     u64,
    reptile_count: u16,
    checksum:      u32,
}

/// Version 1 record: 32-bit millisecond timestamps.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
struct RecordV1 {
    name:                   [u8; NAME_FIELD_LEN],
    species:                u8,
    life_stage:             u8,
    mass_g:                 f32,
    length_mm:              f32,
    overall_health:         u8,
    hunger:                 u8,
    hydration:              u8,
    stress:                 u8,
    reproductive_condition: u8,
    is_shedding:            bool,
    has_parasites:          bool,
    respiratory_infection:  bool,
    last_feeding:           u32,
    last_defecation:        u32,
    temperature_day:        f32,
    temperature_night:      f32,
    humidity:               f32,
    uvb_index:              u8,
    photoperiod_hours:      u16,
    has_water_dish:         bool,
    has_warm_hide:          bool,
    has_cool_hide:          bool,
    behavior:               u8,
    is_gravid:              bool,
    genetics_quality:       u8,
    experience_points:      u32,
    birth_timestamp:        u32,
    last_update:            u32,
}

/// Current record.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
struct RecordV2 {
    name:                   [u8; NAME_FIELD_LEN],
    species:                u8,
    life_stage:             u8,
    mass_g:                 f32,
    length_mm:              f32,
    overall_health:         u8,
    hunger:                 u8,
    hydration:              u8,
    stress:                 u8,
    reproductive_condition: u8,
    is_shedding:            bool,
    has_parasites:          bool,
    respiratory_infection:  bool,
    last_feeding:           u64,
    last_defecation:        u64,
    temperature_day:        f32,
    temperature_night:      f32,
    humidity:               f32,
    uvb_index:              u8,
    photoperiod_hours:      u16,
    has_water_dish:         bool,
    has_warm_hide:          bool,
    has_cool_hide:          bool,
    behavior:               u8,
    is_gravid:              bool,
    genetics_quality:       u8,
    experience_points:      u32,
    birth_timestamp:        u64,
    last_update:            u64,
}

impl From<RecordV1> for RecordV2 {
    fn from(r: RecordV1) -> Self {
        Self {
            name:                   r.name,
            species:                r.species,
            life_stage:             r.life_stage,
            mass_g:                 r.mass_g,
            length_mm:              r.length_mm,
            overall_health:         r.overall_health,
            hunger:                 r.hunger,
            hydration:              r.hydration,
            stress:                 r.stress,
            reproductive_condition: r.reproductive_condition,
            is_shedding:            r.is_shedding,
            has_parasites:          r.has_parasites,
            respiratory_infection:  r.respiratory_infection,
            last_feeding:           r.last_feeding.into(),
            last_defecation:        r.last_defecation.into(),
            temperature_day:        r.temperature_day,
            temperature_night:      r.temperature_night,
            humidity:               r.humidity,
            uvb_index:              r.uvb_index,
            photoperiod_hours:      r.photoperiod_hours,
            has_water_dish:         r.has_water_dish,
            has_warm_hide:          r.has_warm_hide,
            has_cool_hide:          r.has_cool_hide,
            behavior:               r.behavior,
            is_gravid:              r.is_gravid,
            genetics_quality:       r.genetics_quality,
            experience_points:      r.experience_points,
            birth_timestamp:        r.birth_timestamp.into(),
            last_update:            r.last_update.into(),
        }
    }
}

const LIFE_STAGES: [LifeStage; 6] = [
    LifeStage::Egg,
    LifeStage::Hatchling,
    LifeStage::Juvenile,
    LifeStage::SubAdult,
    LifeStage::Adult,
    LifeStage::Senior,
];

const BEHAVIORS: [Behavior; 10] = [
    Behavior::Basking,
    Behavior::Hiding,
    Behavior::Exploring,
    Behavior::Feeding,
    Behavior::Sleeping,
    Behavior::Shedding,
    Behavior::Courting,
    Behavior::Aggressive,
    Behavior::Stressed,
    Behavior::Brumation,
];

fn lookup<T: Copy>(table: &[T], value: u8, what: &str) -> Result<T, IntegrityError> {
    table
        .get(value as usize)
        .copied()
        .ok_or_else(|| IntegrityError::Malformed(format!("unknown {what} {value}")))
}

fn encode_name(name: &str) -> [u8; NAME_FIELD_LEN] {
    let name = truncate_name(name);
    let mut field = [0u8; NAME_FIELD_LEN];
    field[..name.len()].copy_from_slice(name.as_bytes());
    field
}

fn decode_name(field: &[u8; NAME_FIELD_LEN]) -> Result<String, IntegrityError> {
    let end = field.iter().position(|&b| b == 0).unwrap_or(NAME_FIELD_LEN);
    String::from_utf8(field[..end].to_vec())
        .map_err(|_| IntegrityError::Malformed("name is not valid UTF-8".to_string()))
}

impl From<&Reptile> for RecordV2 {
    fn from(r: &Reptile) -> Self {
        let h = &r.health;
        let env = &r.habitat;
        Self {
            name:                   encode_name(&r.name),
            species:                r.species as u8,
            life_stage:             r.life_stage as u8,
            mass_g:                 r.mass_g,
            length_mm:              r.length_mm,
            overall_health:         h.overall_health,
            hunger:                 h.hunger,
            hydration:              h.hydration,
            stress:                 h.stress,
            reproductive_condition: h.reproductive_condition,
            is_shedding:            h.is_shedding,
            has_parasites:          h.has_parasites,
            respiratory_infection:  h.respiratory_infection,
            last_feeding:           h.last_feeding,
            last_defecation:        h.last_defecation,
            temperature_day:        env.temperature_day,
            temperature_night:      env.temperature_night,
            humidity:               env.humidity,
            uvb_index:              env.uvb_index,
            photoperiod_hours:      env.photoperiod_hours,
            has_water_dish:         env.has_water_dish,
            has_warm_hide:          env.has_warm_hide,
            has_cool_hide:          env.has_cool_hide,
            behavior:               r.behavior as u8,
            is_gravid:              r.is_gravid,
            genetics_quality:       r.genetics_quality,
            experience_points:      r.experience_points(),
            birth_timestamp:        r.birth_timestamp(),
            last_update:            r.last_update(),
        }
    }
}

impl TryFrom<RecordV2> for Reptile {
    type Error = IntegrityError;

    fn try_from(r: RecordV2) -> Result<Self, Self::Error> {
        let species = lookup(&SpeciesId::ALL, r.species, "species")?;
        let mut reptile = Reptile::from_parts(
            decode_name(&r.name)?,
            species,
            lookup(&LIFE_STAGES, r.life_stage, "life stage")?,
            r.mass_g,
            r.length_mm,
            HealthState {
                overall_health:         r.overall_health,
                hunger:                 r.hunger,
                hydration:              r.hydration,
                stress:                 r.stress,
                reproductive_condition: r.reproductive_condition,
                is_shedding:            r.is_shedding,
                has_parasites:          r.has_parasites,
                respiratory_infection:  r.respiratory_infection,
                last_feeding:           r.last_feeding,
                last_defecation:        r.last_defecation,
            },
            HabitatState {
                temperature_day:   r.temperature_day,
                temperature_night: r.temperature_night,
                humidity:          r.humidity,
                uvb_index:         r.uvb_index,
                photoperiod_hours: r.photoperiod_hours,
                has_water_dish:    r.has_water_dish,
                has_warm_hide:     r.has_warm_hide,
                has_cool_hide:     r.has_cool_hide,
            },
            lookup(&BEHAVIORS, r.behavior, "behavior")?,
            r.is_gravid,
            r.genetics_quality,
            r.experience_points,
            r.birth_timestamp,
            r.last_update,
        );
        reptile.clamp_to_species(get_species_data(species));
        Ok(reptile)
    }
}

fn malformed(e: bincode::Error) -> IntegrityError {
    IntegrityError::Malformed(e.to_string())
}

fn wire_size<T: Serialize + Default>() -> usize {
    bincode::serialized_size(&T::default()).map_or(0, |n| n as usize)
}

fn header_size(version: u32) -> usize {
    // version + timestamp + count + checksum
    if version == 1 { 4 + 4 + 2 + 4 } else { 4 + 8 + 2 + 4 }
}

// ── Record encode / decode ──────────────────────────────────────

/// Build a current-version `reptile_data` blob.
pub fn encode_save(reptiles: &[Reptile], timestamp: Timestamp) -> SimResult<Vec<u8>> {
    if reptiles.len() > MAX_SAVED_REPTILES {
        return Err(IntegrityError::CapacityExceeded {
            count: reptiles.len(),
            max:   MAX_SAVED_REPTILES,
        }
        .into());
    }
    let mut payload = Vec::with_capacity(reptiles.len() * wire_size::<RecordV2>());
    for reptile in reptiles {
        bincode::serialize_into(&mut payload, &RecordV2::from(reptile))
            .map_err(|e| SimError::Other(anyhow::anyhow!("record encode failed: {e}")))?;
    }
    let header = HeaderV2 {
        version: CURRENT_SAVE_VERSION,
        timestamp,
        reptile_count: reptiles.len() as u16,
        checksum: checksum(&payload),
    };
    let mut blob = bincode::serialize(&header)
        .map_err(|e| SimError::Other(anyhow::anyhow!("header encode failed: {e}")))?;
    blob.extend_from_slice(&payload);
    Ok(blob)
}

#[derive(Debug, Clone)]
pub struct LoadedSave {
    /// Version the record was stored with. Already upgraded in memory.
    pub version:   u32,
    pub timestamp: Timestamp,
    pub reptiles:  Vec<Reptile>,
}

/// Verify and decode a `reptile_data` blob of any supported version.
pub fn decode_save(blob: &[u8]) -> Result<LoadedSave, IntegrityError> {
    if blob.len() < 4 {
        return Err(IntegrityError::Truncated { len: blob.len(), expected: 4 });
    }
    let version = u32::from_le_bytes([blob[0], blob[1], blob[2], blob[3]]);
    if version > CURRENT_SAVE_VERSION {
        return Err(IntegrityError::UnsupportedVersion {
            found:   version,
            current: CURRENT_SAVE_VERSION,
        });
    }
    if version == 0 {
        return Err(IntegrityError::Malformed("save version 0".to_string()));
    }

    let head_len = header_size(version);
    if blob.len() < head_len {
        return Err(IntegrityError::Truncated { len: blob.len(), expected: head_len });
    }
    let (head, payload) = blob.split_at(head_len);
    let (timestamp, count, expected_csum) = if version == 1 {
        let h: HeaderV1 = bincode::deserialize(head).map_err(malformed)?;
        (Timestamp::from(h.timestamp), h.reptile_count as usize, h.checksum)
    } else {
        let h: HeaderV2 = bincode::deserialize(head).map_err(malformed)?;
        (h.timestamp, h.reptile_count as usize, h.checksum)
    };

    if count > MAX_SAVED_REPTILES {
        return Err(IntegrityError::CapacityExceeded { count, max: MAX_SAVED_REPTILES });
    }

    let actual = checksum(payload);
    if actual != expected_csum {
        return Err(IntegrityError::ChecksumMismatch { expected: expected_csum, actual });
    }

    let record_len = if version == 1 { wire_size::<RecordV1>() } else { wire_size::<RecordV2>() };
    let expected_len = count * record_len;
    if payload.len() < expected_len {
        return Err(IntegrityError::Truncated { len: payload.len(), expected: expected_len });
    }
    if payload.len() > expected_len {
        return Err(IntegrityError::Malformed(format!(
            "{} trailing bytes after {count} records",
            payload.len() - expected_len
        )));
    }

    let mut reptiles = Vec::with_capacity(count);
    for chunk in payload.chunks_exact(record_len) {
        let record: RecordV2 = if version == 1 {
            bincode::deserialize::<RecordV1>(chunk).map_err(malformed)?.into()
        } else {
            bincode::deserialize(chunk).map_err(malformed)?
        };
        reptiles.push(Reptile::try_from(record)?);
    }

    Ok(LoadedSave { version, timestamp, reptiles })
}

// ── Save manager ────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct SaveStats {
    pub total_saves:           u64,
    pub successful_saves:      u64,
    pub failed_saves:          u64,
    pub last_save_duration_ms: u64,
    /// Bytes in the last successfully written `reptile_data`.
    pub data_size:             usize,
}

/// Owns the store and every key the game writes to it.
pub struct SaveManager<S: KvStore> {
    store: S,
    stats: SaveStats,
}

impl<S: KvStore> SaveManager<S> {
    pub fn new(store: S) -> Self {
        Self { store, stats: SaveStats::default() }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn into_inner(self) -> S {
        self.store
    }

    /// Report the stored version, if any, and announce pending upgrades.
    pub fn initialize(&self) -> SimResult<Option<u32>> {
        let Some(bytes) = self.store.get(KEY_SAVE_VERSION)? else {
            log::info!("No save data found");
            return Ok(None);
        };
        let version = read_u32(&bytes, KEY_SAVE_VERSION)?;
        if version < CURRENT_SAVE_VERSION {
            log::info!("Save version {version} will be upgraded to {CURRENT_SAVE_VERSION} on next save");
        } else if version > CURRENT_SAVE_VERSION {
            log::warn!("Save version {version} is newer than this build ({CURRENT_SAVE_VERSION})");
        }
        Ok(Some(version))
    }

    /// Write the collection and commit.
    pub fn save(&mut self, reptiles: &[Reptile], now: Timestamp) -> SimResult<()> {
        let started = Instant::now();
        self.stats.total_saves += 1;
        let result = self.write_save(reptiles, now);
        self.stats.last_save_duration_ms = started.elapsed().as_millis() as u64;
        match &result {
            Ok(size) => {
                self.stats.successful_saves += 1;
                self.stats.data_size = *size;
                log::info!("Saved {} reptiles ({size} bytes)", reptiles.len());
            }
            Err(e) => {
                self.stats.failed_saves += 1;
                log::error!("Save failed: {e}");
            }
        }
        result.map(|_| ())
    }

    fn write_save(&mut self, reptiles: &[Reptile], now: Timestamp) -> SimResult<usize> {
        let blob = encode_save(reptiles, now)?;
        self.store.set(KEY_SAVE_VERSION, &CURRENT_SAVE_VERSION.to_le_bytes())?;
        self.store.set(KEY_LAST_SAVE_TIME, &now.to_le_bytes())?;
        self.store.set(KEY_REPTILE_COUNT, &(reptiles.len() as u16).to_le_bytes())?;
        self.store.set(KEY_REPTILE_DATA, &blob)?;
        self.store.commit()?;
        Ok(blob.len())
    }

    /// `Ok(None)` when nothing has been saved.
    pub fn load(&self) -> SimResult<Option<LoadedSave>> {
        let Some(blob) = self.store.get(KEY_REPTILE_DATA)? else {
            log::info!("No reptiles saved");
            return Ok(None);
        };
        let loaded = decode_save(&blob).map_err(|e| {
            log::error!("Rejected stored reptile data: {e}");
            e
        })?;

        if let Some(bytes) = self.store.get(KEY_REPTILE_COUNT)? {
            let stored = read_u16(&bytes, KEY_REPTILE_COUNT)? as usize;
            if stored != loaded.reptiles.len() {
                log::warn!(
                    "Reptile count key says {stored}, record holds {}; using the record",
                    loaded.reptiles.len()
                );
            }
        }
        if loaded.version < CURRENT_SAVE_VERSION {
            log::info!("Upgraded save from version {} to {CURRENT_SAVE_VERSION}", loaded.version);
        }
        log::info!("Loaded {} reptiles", loaded.reptiles.len());
        Ok(Some(loaded))
    }

    pub fn has_save_data(&self) -> SimResult<bool> {
        Ok(self.store.get(KEY_SAVE_VERSION)?.is_some())
    }

    /// Accepts both the 8-byte current and the 4-byte version 1 encoding.
    pub fn last_save_time(&self) -> SimResult<Option<Timestamp>> {
        match self.store.get(KEY_LAST_SAVE_TIME)? {
            None => Ok(None),
            Some(bytes) => match bytes.len() {
                8 => {
                    let mut raw = [0u8; 8];
                    raw.copy_from_slice(&bytes);
                    Ok(Some(u64::from_le_bytes(raw)))
                }
                _ => Ok(Some(read_u32(&bytes, KEY_LAST_SAVE_TIME)? as Timestamp)),
            },
        }
    }

    /// Bytes in the stored `reptile_data`, 0 when absent.
    pub fn save_size(&self) -> SimResult<usize> {
        Ok(self.store.get(KEY_REPTILE_DATA)?.map_or(0, |b| b.len()))
    }

    /// Mirror the primary keys into their `_backup` slots.
    pub fn backup(&mut self) -> SimResult<()> {
        if self.store.get(KEY_REPTILE_DATA)?.is_none() {
            return Err(StorageError::Backend {
                op:     "backup",
                key:    KEY_REPTILE_DATA.to_string(),
                reason: "no save data".to_string(),
            }
            .into());
        }
        self.copy_keys(|k| k.to_string(), backup_key)?;
        log::info!("Backup written");
        Ok(())
    }

    /// Copy the `_backup` slots over the primary keys.
    pub fn restore_backup(&mut self) -> SimResult<()> {
        let data_backup = backup_key(KEY_REPTILE_DATA);
        if self.store.get(&data_backup)?.is_none() {
            return Err(StorageError::Backend {
                op:     "restore_backup",
                key:    data_backup,
                reason: "no backup".to_string(),
            }
            .into());
        }
        self.copy_keys(backup_key, |k| k.to_string())?;
        log::info!("Backup restored");
        Ok(())
    }

    fn copy_keys(
        &mut self,
        from: impl Fn(&str) -> String,
        to: impl Fn(&str) -> String,
    ) -> SimResult<()> {
        for key in PRIMARY_KEYS {
            let (src, dst) = (from(key), to(key));
            match self.store.get(&src)? {
                Some(value) => self.store.set(&dst, &value)?,
                None => self.store.erase(&dst)?,
            }
        }
        self.store.commit()?;
        Ok(())
    }

    /// Erase everything in the namespace, backups included.
    pub fn clear_all(&mut self) -> SimResult<()> {
        log::warn!("Clearing all save data");
        self.store.erase_all()?;
        self.store.commit()?;
        Ok(())
    }

    pub fn statistics(&self) -> &SaveStats {
        &self.stats
    }
}

fn read_u32(bytes: &[u8], key: &str) -> Result<u32, IntegrityError> {
    let raw: [u8; 4] = bytes
        .try_into()
        .map_err(|_| IntegrityError::Malformed(format!("'{key}' holds {} bytes", bytes.len())))?;
    Ok(u32::from_le_bytes(raw))
}

fn read_u16(bytes: &[u8], key: &str) -> Result<u16, IntegrityError> {
    let raw: [u8; 2] = bytes
        .try_into()
        .map_err(|_| IntegrityError::Malformed(format!("'{key}' holds {} bytes", bytes.len())))?;
    Ok(u16::from_le_bytes(raw))
}
