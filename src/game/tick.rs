//! Simulation Driver
//!
//! [`Game`] owns every subsystem and advances the run one fixed step at a
//! time. A tick is a fixed sequence of phases; everything that happened
//! is returned as an ordered [`RunEvent`] list, and external readers take
//! [`Snapshot`]s between ticks. Out-of-band operations (revives, shop
//! purchases, the ability) are explicit methods, never input flags
//! smuggled through the tick.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::rng::GameRng;
use crate::game::collision::{self, ContactOutcome};
use crate::game::effects::{BuffKind, EffectQueue, ABILITY_SHIELD_SECS, REVIVE_GRACE_SECS};
use crate::game::entity::{EntityId, EntityKind, EntityRegistry, Payload};
use crate::game::events::RunEvent;
use crate::game::input::{InputIntent, PlayerMotion};
use crate::game::session::{DamageOutcome, GameSession, GameStatus, LetterOutcome};
use crate::game::shop::{self, ShopItemKind};
use crate::game::spawner::{Spawner, SpawnerConfig};
use crate::persist::{PersistentStats, StatsLedger, StatsStore};
use crate::REMOVE_BEHIND;

/// Simulation tuning.
#[derive(Clone, Debug)]
pub struct GameConfig {
    /// Procedural generator tuning.
    pub spawner: SpawnerConfig,
    /// An alien fires once the player closes within this distance.
    pub alien_fire_range: f32,
    /// How fast missiles close on the player, on top of the player's own
    /// speed.
    pub missile_closing_speed: f32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            spawner: SpawnerConfig::default(),
            alien_fire_range: 40.0,
            missile_closing_speed: 25.0,
        }
    }
}

/// Everything that happened during one tick, in order.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TickResult {
    /// Ordered event stream for the tick.
    pub events: Vec<RunEvent>,
}

impl TickResult {
    /// Whether nothing notable happened.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

/// The simulation root: session, entities, player, generator, buffs and
/// the stats ledger, advanced by [`Game::tick`].
pub struct Game {
    session: GameSession,
    registry: EntityRegistry,
    player: PlayerMotion,
    spawner: Spawner,
    effects: EffectQueue,
    rng: GameRng,
    ledger: StatsLedger,
    config: GameConfig,
    /// Events produced by out-of-band operations, drained by the next tick.
    queued: Vec<RunEvent>,
}

impl Game {
    /// New game with default tuning. The seed fixes the whole corridor:
    /// two games with the same seed and the same inputs play out
    /// identically.
    pub fn new(seed: u64, store: Box<dyn StatsStore>) -> Self {
        Self::with_config(seed, store, GameConfig::default())
    }

    /// New game with explicit tuning.
    pub fn with_config(seed: u64, store: Box<dyn StatsStore>, config: GameConfig) -> Self {
        Self {
            session: GameSession::new(),
            registry: EntityRegistry::new(),
            player: PlayerMotion::default(),
            spawner: Spawner::new(&config.spawner),
            effects: EffectQueue::new(),
            rng: GameRng::new(seed),
            ledger: StatsLedger::load(store),
            config,
            queued: Vec::new(),
        }
    }

    /// Read-only view of the session.
    pub fn session(&self) -> &GameSession {
        &self.session
    }

    /// Read-only view of the entity registry.
    pub fn registry(&self) -> &EntityRegistry {
        &self.registry
    }

    /// Read-only view of the persistent stats.
    pub fn stats(&self) -> &PersistentStats {
        self.ledger.stats()
    }

    /// Start the first run from the menu.
    pub fn start_game(&mut self) {
        self.session.start_game(&mut self.ledger);
        self.begin_run();
    }

    /// Start a new run from any state, folding the abandoned score into
    /// the high score first.
    pub fn restart_game(&mut self) {
        self.session.restart_game(&mut self.ledger);
        self.begin_run();
    }

    fn begin_run(&mut self) {
        self.registry.clear();
        self.spawner.reset(self.session.distance, &self.config.spawner);
        self.effects.clear();
        self.player.reset();
        self.queued.clear();
    }

    /// Suspend the run.
    pub fn pause(&mut self) {
        self.session.pause();
    }

    /// Resume a paused run.
    pub fn resume(&mut self) {
        self.session.resume();
    }

    /// Open the shop mid-run (the portal does this automatically).
    pub fn open_shop(&mut self) {
        self.session.open_shop();
    }

    /// Close the shop and resume.
    pub fn close_shop(&mut self) {
        self.session.close_shop();
    }

    /// The current shop offer pool.
    pub fn catalog(&self) -> Vec<shop::ShopItem> {
        shop::catalog(&self.session)
    }

    /// Buy an item at its catalog price. Allowed while playing or in the
    /// shop; atomic either way.
    pub fn buy_item(&mut self, kind: ShopItemKind) -> bool {
        if !matches!(self.session.status, GameStatus::Playing | GameStatus::Shop) {
            return false;
        }
        shop::buy_item(&mut self.session, &mut self.effects, kind, kind.cost())
    }

    /// Key revive from GAME_OVER, with the post-revive grace buff.
    pub fn revive_with_key(&mut self) -> bool {
        if !self.session.revive_with_key() {
            return false;
        }
        self.effects.schedule(&mut self.session, BuffKind::ReviveGrace, REVIVE_GRACE_SECS, 0.0);
        self.queued.push(RunEvent::revived(self.session.distance, false));
        true
    }

    /// Ad-reward revive from GAME_OVER, with the post-revive grace buff.
    pub fn revive_with_ad(&mut self) -> bool {
        if !self.session.revive_with_ad() {
            return false;
        }
        self.effects.schedule(&mut self.session, BuffKind::ReviveGrace, REVIVE_GRACE_SECS, 0.0);
        self.queued.push(RunEvent::revived(self.session.distance, true));
        true
    }

    /// Ad-reward key grant, once per run.
    pub fn grant_ad_key(&mut self) -> bool {
        self.session.grant_ad_key(&mut self.ledger)
    }

    /// Fire the owned immortality ability: a timed shield, not stackable
    /// with itself.
    pub fn activate_ability(&mut self) -> bool {
        if self.session.status != GameStatus::Playing
            || !self.session.has_immortality
            || self.effects.has_pending(BuffKind::AbilityShield)
        {
            return false;
        }
        self.effects.schedule(&mut self.session, BuffKind::AbilityShield, ABILITY_SHIELD_SECS, 0.0);
        true
    }

    /// Set the persisted display name.
    pub fn set_player_name(&mut self, name: &str) {
        self.ledger.set_player_name(name);
    }

    /// Advance the simulation by `dt` seconds under the given intents.
    ///
    /// Outside PLAYING this only drains queued out-of-band events; the
    /// world, the clock and every buff countdown stay frozen.
    pub fn tick(&mut self, dt: f32, intent: InputIntent) -> TickResult {
        let mut events = std::mem::take(&mut self.queued);

        if self.session.status != GameStatus::Playing {
            return TickResult { events };
        }

        // 1. Clock and player kinematics
        self.session.clock += dt as f64;
        if intent.ability() {
            self.activate_ability();
        }
        self.player.apply(intent, self.session.has_double_jump);
        self.player.advance(dt);

        // 2. Forward motion
        let prev_distance = self.session.distance;
        self.session.distance += self.session.speed * dt;

        // 3. Hostile entity behavior
        self.drive_hostiles(dt);

        // 4. Corridor generation and cleanup behind the player
        self.spawner.advance(&self.session, &mut self.registry, &mut self.rng, &self.config.spawner);
        let freed = self.registry.purge_behind(self.session.distance - REMOVE_BEHIND);
        if freed > 0 {
            debug!(freed, "purged entities behind player");
        }

        // 5. Contacts over the swept interval, in travel order
        let pose = self.player.pose(self.session.distance);
        let contacts =
            collision::resolve(&self.registry, &pose, prev_distance, self.session.is_magnet_active);
        for contact in contacts {
            if self.session.status != GameStatus::Playing {
                break;
            }
            self.registry.deactivate(contact.id);
            self.apply_contact(contact.outcome, &mut events);
        }

        // 6. Buff expiry on the simulation clock
        for kind in self.effects.expire_due(&mut self.session) {
            events.push(RunEvent::buff_expired(self.session.distance, kind));
        }

        // 7. Drop entities consumed this tick
        self.registry.sweep();

        TickResult { events }
    }

    /// Aliens fire when the player closes in; missiles fly toward the
    /// player on top of the player's own speed.
    fn drive_hostiles(&mut self, dt: f32) {
        let mut firing: Vec<(EntityId, u8, f32)> = Vec::new();
        let mut missiles: Vec<EntityId> = Vec::new();
        self.registry.for_each_active(|entity| match entity.kind {
            EntityKind::Alien => {
                if let Payload::Alien { fired: false } = entity.payload {
                    let ahead = entity.distance_ahead(self.session.distance);
                    if ahead > 0.0 && ahead <= self.config.alien_fire_range {
                        firing.push((entity.id, entity.lane, entity.distance));
                    }
                }
            }
            EntityKind::Missile => missiles.push(entity.id),
            _ => {}
        });

        for (id, lane, distance) in firing {
            if let Some(alien) = self.registry.get_mut(id) {
                alien.payload = Payload::Alien { fired: true };
            }
            self.registry.spawn(EntityKind::Missile, lane, distance - 2.0, Payload::None);
            debug!(alien = id, lane, "alien fired");
        }

        let closing = self.config.missile_closing_speed * dt;
        for id in missiles {
            if let Some(missile) = self.registry.get_mut(id) {
                missile.distance -= closing;
            }
        }
    }

    fn apply_contact(&mut self, outcome: ContactOutcome, events: &mut Vec<RunEvent>) {
        let at = self.session.distance;
        match outcome {
            ContactOutcome::Damage => match self.session.take_damage(&mut self.ledger) {
                DamageOutcome::Shrugged => {}
                DamageOutcome::LostLife => {
                    events.push(RunEvent::damaged(at, self.session.lives));
                }
                DamageOutcome::Died => {
                    events.push(RunEvent::game_over(at, self.session.score));
                    self.unlock_achievements(events);
                }
            },
            ContactOutcome::CollectGem { points } => {
                self.session.collect_gem(points, &mut self.ledger);
                events.push(RunEvent::gem_collected(at, points, self.session.score));
                self.unlock_achievements(events);
            }
            ContactOutcome::CollectLetter { index, letter } => {
                match self.session.collect_letter(index, &mut self.ledger) {
                    LetterOutcome::Ignored => {}
                    LetterOutcome::Collected => {
                        events.push(RunEvent::letter_collected(at, index, letter));
                    }
                    LetterOutcome::LevelAdvanced => {
                        events.push(RunEvent::letter_collected(at, index, letter));
                        events.push(RunEvent::level_advanced(
                            at,
                            self.session.level,
                            self.session.word(),
                        ));
                        self.unlock_achievements(events);
                    }
                    LetterOutcome::Victory => {
                        events.push(RunEvent::letter_collected(at, index, letter));
                        events.push(RunEvent::victory(at, self.session.score));
                        self.unlock_achievements(events);
                    }
                }
            }
            ContactOutcome::CollectHeart => {
                let healed = self.session.collect_heart();
                events.push(RunEvent::heart_collected(at, healed));
            }
            ContactOutcome::CollectKey => {
                self.session.collect_key(&mut self.ledger);
                events.push(RunEvent::key_collected(at, self.session.keys));
                self.unlock_achievements(events);
            }
            ContactOutcome::EnterShop => {
                self.session.open_shop();
                events.push(RunEvent::shop_entered(at));
            }
        }
    }

    fn unlock_achievements(&mut self, events: &mut Vec<RunEvent>) {
        let unlocked = self
            .ledger
            .check_achievements(self.session.score, self.session.level);
        for achievement in unlocked {
            events.push(RunEvent::achievement_unlocked(self.session.distance, achievement));
        }
    }

    /// Immutable snapshot for external readers, taken between ticks.
    pub fn snapshot(&self) -> Snapshot {
        let mut entities: Vec<EntityView> = Vec::with_capacity(self.registry.active_count());
        self.registry.for_each_active(|entity| {
            entities.push(EntityView {
                id: entity.id,
                kind: entity.kind,
                lane: entity.lane,
                distance_ahead: entity.distance_ahead(self.session.distance),
            });
        });

        Snapshot {
            hud: HudView {
                status: self.session.status,
                score: self.session.score,
                lives: self.session.lives,
                max_lives: self.session.max_lives,
                level: self.session.level,
                speed: self.session.speed,
                keys: self.session.keys,
                distance: self.session.distance,
                gems_collected: self.session.gems_collected,
                current_word: self.session.word(),
                collected_letters: self.session.collected_letters.iter().copied().collect(),
                is_immortality_active: self.session.is_immortality_active,
                is_magnet_active: self.session.is_magnet_active,
                can_use_ad_revive: self.session.can_use_ad_revive,
                can_use_ad_key: self.session.can_use_ad_key,
                has_double_jump: self.session.has_double_jump,
                has_immortality: self.session.has_immortality,
            },
            entities,
        }
    }
}

/// HUD-facing view of the session.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HudView {
    /// Current status.
    pub status: GameStatus,
    /// Run score.
    pub score: u32,
    /// Current lives.
    pub lives: u32,
    /// Life cap.
    pub max_lives: u32,
    /// Current level.
    pub level: u32,
    /// Forward speed.
    pub speed: f32,
    /// Keys in inventory.
    pub keys: u32,
    /// Distance traveled this run.
    pub distance: f32,
    /// Gems picked up this run.
    pub gems_collected: u32,
    /// The word being collected.
    pub current_word: String,
    /// Collected indices of the current word, ascending.
    pub collected_letters: Vec<usize>,
    /// Hits currently absorbed.
    pub is_immortality_active: bool,
    /// Gem magnet currently active.
    pub is_magnet_active: bool,
    /// Ad revive still available this run.
    pub can_use_ad_revive: bool,
    /// Ad key still available this run.
    pub can_use_ad_key: bool,
    /// Double jump owned.
    pub has_double_jump: bool,
    /// Immortality ability owned.
    pub has_immortality: bool,
}

/// One entity as an external reader sees it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EntityView {
    /// Entity id.
    pub id: EntityId,
    /// What it is.
    pub kind: EntityKind,
    /// Lane index.
    pub lane: u8,
    /// Forward gap to the player (negative when behind).
    pub distance_ahead: f32,
}

/// Full state snapshot for external readers.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Session summary.
    pub hud: HudView,
    /// Every active entity.
    pub entities: Vec<EntityView>,
}
