//! Strategist - the per-turn decision pass
//!
//! One call to `plan_turn` folds the snapshot into the knowledge map, keeps
//! the role state up to date and produces the order batch. Every unit gets
//! at most one order, and destination cells are reserved as orders are
//! issued so no two units are routed into the same hex.

use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::collections::BTreeSet;

use crate::core::config::BotConfig;
use crate::core::types::{PlayerId, Resources};
use crate::grid::{Coords, Direction};
use crate::knowledge::KnowledgeMap;
use crate::orchestrator::roles::{
    nearest_free_unit, pick_explorer, BlockTask, BuildTask, RoleState, TrackedUnit,
};
use crate::orchestrator::TurnPolicy;
use crate::pathfinding::find_step;
use crate::snapshot::{GameState, Order};
use crate::tactics::{
    attack_or_advance, best_site, estimate_resources_per_turn, nearest_resource,
    nearest_unknown, score_site, should_spawn, spawn_direction, turns_until_depleted,
    units_near,
};

/// Scratch state for a single turn
struct TurnPlan {
    orders: Vec<Order>,
    /// Units that already have a role or an order this turn
    claimed: BTreeSet<Coords>,
    budget: Resources,
    num_players: usize,
    wants_base: bool,
}

impl TurnPlan {
    fn issue(&mut self, unit: Coords, order: Option<Order>) {
        self.claimed.insert(unit);
        self.orders.extend(order);
    }
}

/// Bot brain: knowledge map plus role state, driven one turn at a time
pub struct Strategist {
    config: BotConfig,
    map: KnowledgeMap,
    roles: RoleState,
    rng: ChaCha8Rng,
    exploring: bool,
}

impl Strategist {
    pub fn new(config: BotConfig) -> Self {
        let rng = ChaCha8Rng::seed_from_u64(config.seed);
        Self {
            config,
            map: KnowledgeMap::new(),
            roles: RoleState::new(),
            rng,
            exploring: true,
        }
    }

    pub fn config(&self) -> &BotConfig {
        &self.config
    }

    pub fn map(&self) -> &KnowledgeMap {
        &self.map
    }

    pub fn roles(&self) -> &RoleState {
        &self.roles
    }

    pub fn is_exploring(&self) -> bool {
        self.exploring
    }

    // === Step 1: knowledge ===

    fn update_knowledge(&mut self, state: &GameState, player: PlayerId) {
        self.map.clear_reservations();
        let summary = self
            .map
            .refresh(state, player, self.config.exploration.edge_scan_depth);
        let fringe = self.map.expand_fringe();
        self.roles.blocks.prune(&self.map);

        if summary.edges_found > 0 {
            tracing::info!("Found {} new edge cells", summary.edges_found);
        }
        tracing::debug!(
            "Turn {}: observed {} cells, {} new fringe, {} ghosts cleared",
            state.turn,
            summary.observed,
            fringe,
            summary.ghosts_cleared
        );
    }

    /// Find every role holder on the new map and drop the ones that vanished
    fn locate_roles(&mut self, plan: &mut TurnPlan) {
        let lost: Vec<(Coords, Coords)> = self
            .roles
            .saboteurs
            .iter()
            .filter(|(cell, base)| {
                !self.map.is_friendly_unit(**cell) || !self.map.enemy_bases().contains(*base)
            })
            .map(|(cell, base)| (*cell, *base))
            .collect();
        for (cell, base) in lost {
            tracing::info!("Saboteur at {} lost, base {} open again", cell, base);
            self.roles.saboteurs.remove(&cell);
            self.roles.blocks.unmark(base);
        }
        plan.claimed.extend(self.roles.saboteurs.keys().copied());

        if let Some(task) = self.roles.blocker {
            match task.unit.locate(&self.map, &plan.claimed) {
                Some(cell) => {
                    plan.claimed.insert(cell);
                    self.roles.blocker = Some(BlockTask {
                        unit: TrackedUnit::new(cell),
                        ..task
                    });
                }
                None => {
                    tracing::warn!("Blocker last seen at {} is missing", task.unit.last());
                    self.roles.blocker = None;
                }
            }
        }

        if let Some(task) = self.roles.builder {
            match task.unit.locate(&self.map, &plan.claimed) {
                Some(cell) => {
                    plan.claimed.insert(cell);
                    self.roles.builder = Some(BuildTask {
                        unit: TrackedUnit::new(cell),
                        ..task
                    });
                }
                None => {
                    tracing::warn!("Builder last seen at {} is missing", task.unit.last());
                    self.roles.builder = None;
                }
            }
        }

        if let Some(explorer) = self.roles.explorer {
            match explorer.locate(&self.map, &plan.claimed) {
                Some(cell) => self.roles.explorer = Some(TrackedUnit::new(cell)),
                None => {
                    tracing::warn!("Explorer last seen at {} is missing", explorer.last());
                    self.roles.explorer = None;
                    self.roles.explorer_target = None;
                }
            }
        }
    }

    // === Step 2: exploring status ===

    fn update_explorer(&mut self, plan: &mut TurnPlan) {
        self.exploring = !self.map.exploration_complete();
        let enough_units =
            self.map.own_units().len() >= self.config.exploration.min_units_for_explorer;

        if !self.exploring || !enough_units {
            if self.roles.explorer.take().is_some() {
                tracing::info!("Explorer released");
            }
            self.roles.explorer_target = None;
            return;
        }

        if self.roles.explorer.is_none() {
            if let Some(cell) = pick_explorer(&self.map, &plan.claimed) {
                tracing::info!("Explorer recruited at {}", cell);
                self.roles.explorer = Some(TrackedUnit::new(cell));
            }
        }

        if let Some(cell) = self.roles.explorer_cell() {
            plan.claimed.insert(cell);
            self.map.mark_explorer(cell);
        }
    }

    // === Step 3: building ===

    fn plan_build(&mut self, plan: &mut TurnPlan) {
        let site_cfg = &self.config.hive_site;
        let best = best_site(&self.map, site_cfg);
        let best_score = best.map_or(0.0, |s| s.score);
        plan.wants_base = !self.exploring
            || self.map.unknown_count() < site_cfg.unknown_build_limit
            || best_score > site_cfg.score_threshold;

        if let Some(task) = self.roles.builder {
            if !self.site_still_valid(task.site) {
                tracing::info!("Site {} no longer worth a base, builder released", task.site);
                plan.claimed.remove(&task.unit.last());
                self.roles.builder = None;
            }
        }

        if self.roles.builder.is_none() {
            let Some(site) = best else {
                return;
            };
            let economy = &self.config.economy;
            let can_build = plan.wants_base
                && site.score > site_cfg.score_threshold
                && self.map.own_bases().len() < economy.max_bases
                && plan.budget >= economy.base_cost;
            if !can_build {
                return;
            }
            let Some(unit) = nearest_free_unit(&self.map, &plan.claimed, site.coords) else {
                return;
            };
            tracing::info!(
                "Builder at {} assigned to site {} (score {:.2})",
                unit,
                site.coords,
                site.score
            );
            plan.claimed.insert(unit);
            self.roles.builder = Some(BuildTask {
                unit: TrackedUnit::new(unit),
                site: site.coords,
            });
        }

        if let Some(task) = self.roles.builder {
            self.builder_step(task, plan);
        }
    }

    /// A base may still go up at `cell`: it scores above the threshold and
    /// the base limit is not reached
    fn site_still_valid(&self, cell: Coords) -> bool {
        let site_cfg = &self.config.hive_site;
        self.map.own_bases().len() < self.config.economy.max_bases
            && score_site(&self.map, cell, site_cfg).is_some_and(|s| s > site_cfg.score_threshold)
    }

    fn builder_step(&mut self, mut task: BuildTask, plan: &mut TurnPlan) {
        let unit = task.unit.last();
        let base_cost = self.config.economy.base_cost;

        if unit == task.site {
            if plan.budget < base_cost {
                // Wait on site until the balance allows it
                plan.issue(unit, None);
                return;
            }
            tracing::info!("Building base at {}", unit);
            plan.issue(unit, Some(Order::build_hive(unit)));
            plan.budget -= base_cost;
            self.roles.builder = None;
            return;
        }

        let stop_adjacent = !self.map.is_open(task.site);
        if stop_adjacent && unit.distance(&task.site) == 1 {
            // Site is occupied: settle for the cell next to it, or wait
            if plan.budget >= base_cost && self.site_still_valid(unit) {
                tracing::info!("Site {} taken, building at {}", task.site, unit);
                plan.issue(unit, Some(Order::build_hive(unit)));
                plan.budget -= base_cost;
                self.roles.builder = None;
            } else {
                task.unit.follow(unit, None);
                self.roles.builder = Some(task);
                plan.issue(unit, None);
            }
            return;
        }

        match find_step(&mut self.map, unit, task.site, stop_adjacent, &self.config.pathing) {
            Some(order) => {
                task.unit.follow(unit, Some(&order));
                self.roles.builder = Some(task);
                plan.issue(unit, Some(order));
            }
            None => {
                tracing::warn!("No path from {} to site {}, build abandoned", unit, task.site);
                plan.claimed.remove(&unit);
                self.roles.builder = None;
            }
        }
    }

    // === Step 4: blocking ===

    fn plan_blocker(&mut self, plan: &mut TurnPlan) {
        if self.roles.blocker.is_none() && self.blocker_wanted(plan) {
            self.roles.blocks.refresh_targets(&self.map);
            if let Some((base, staging)) = self.roles.blocks.next_unblocked() {
                if let Some(unit) = nearest_free_unit(&self.map, &plan.claimed, staging) {
                    tracing::info!(
                        "Blocker at {} assigned to enemy base {} via {}",
                        unit,
                        base,
                        staging
                    );
                    plan.claimed.insert(unit);
                    self.roles.blocker = Some(BlockTask {
                        unit: TrackedUnit::new(unit),
                        base,
                        staging,
                    });
                }
            }
        }

        let Some(mut task) = self.roles.blocker else {
            return;
        };
        let unit = task.unit.last();

        if unit == task.staging {
            tracing::info!("Blocker arrived at {}, guarding base {}", unit, task.base);
            self.roles.saboteurs.insert(unit, task.base);
            self.roles.blocks.mark_blocked(task.base);
            self.roles.blocker = None;
            return;
        }

        let costs = &self.config.pathing;
        match attack_or_advance(&mut self.map, task.base, unit, task.staging, costs) {
            Some(order) => {
                task.unit.follow(unit, Some(&order));
                self.roles.blocker = Some(task);
                plan.issue(unit, Some(order));
            }
            None => {
                tracing::warn!(
                    "No path from {} to staging {}, block abandoned",
                    unit,
                    task.staging
                );
                plan.claimed.remove(&unit);
                self.roles.blocker = None;
            }
        }
    }

    fn blocker_wanted(&self, plan: &TurnPlan) -> bool {
        let quota = self.config.economy.units_per_base * self.map.own_bases().len();
        !self.exploring
            && self.map.own_units().len() >= quota
            && self.roles.blocks.blocked_count() < plan.num_players.saturating_sub(1)
    }

    // === Step 5: saboteurs ===

    fn plan_saboteurs(&mut self, plan: &mut TurnPlan) {
        let saboteurs: Vec<(Coords, Coords)> =
            self.roles.saboteurs.iter().map(|(c, b)| (*c, *b)).collect();
        for (cell, base) in saboteurs {
            let order = attack_or_advance(&mut self.map, base, cell, cell, &self.config.pathing);
            plan.issue(cell, order);
        }
    }

    // === Step 6: units carrying resources ===

    fn plan_returns(&mut self, plan: &mut TurnPlan) {
        let loaded: Vec<Coords> = self
            .map
            .own_units()
            .iter()
            .copied()
            .filter(|u| !plan.claimed.contains(u) && self.map.has_payload(*u))
            .collect();

        for unit in loaded {
            let Some(base) = self.map.nearest_own_base(unit) else {
                plan.issue(unit, None);
                continue;
            };
            let order = if unit.distance(&base) == 1 {
                Some(Order::forage(unit))
            } else {
                find_step(&mut self.map, unit, base, true, &self.config.pathing)
                    .or_else(|| self.fallback_move(unit))
            };
            plan.issue(unit, order);
        }
    }

    // === Step 7: free units ===

    fn plan_free_units(&mut self, plan: &mut TurnPlan) {
        if let Some(explorer) = self.roles.explorer {
            let cell = explorer.last();
            let order = self.explore_step(cell);
            let mut tracked = explorer;
            tracked.follow(cell, order.as_ref());
            self.roles.explorer = Some(tracked);
            plan.orders.extend(order);
        }

        let free: Vec<Coords> = self
            .map
            .own_units()
            .iter()
            .copied()
            .filter(|u| !plan.claimed.contains(u))
            .collect();

        for unit in free {
            let order = self.forage_step(unit);
            plan.issue(unit, order);
        }
    }

    fn explore_step(&mut self, cell: Coords) -> Option<Order> {
        let target = nearest_unknown(&self.map, cell, self.roles.explorer_target);
        if target != self.roles.explorer_target {
            if let Some(t) = target {
                tracing::info!("Explorer at {} heading for {}", cell, t);
            }
            self.roles.explorer_target = target;
        }
        let target = target?;
        find_step(&mut self.map, cell, target, true, &self.config.pathing)
            .or_else(|| self.fallback_move(cell))
    }

    fn forage_step(&mut self, unit: Coords) -> Option<Order> {
        if self.map.resources_at(unit) > 0 {
            return Some(Order::forage(unit));
        }
        if let Some(field) = nearest_resource(&self.map, unit) {
            return find_step(&mut self.map, unit, field, false, &self.config.pathing)
                .or_else(|| self.fallback_move(unit));
        }
        let frontier = nearest_unknown(&self.map, unit, None)?;
        find_step(&mut self.map, unit, frontier, true, &self.config.pathing)
            .or_else(|| self.fallback_move(unit))
    }

    /// Random open, unreserved neighbour
    fn fallback_move(&mut self, unit: Coords) -> Option<Order> {
        let options: Vec<Direction> = Direction::ALL
            .into_iter()
            .filter(|d| {
                let cell = unit.neighbor(*d);
                self.map.is_open(cell) && !self.map.is_reserved(cell)
            })
            .collect();
        let direction = *options.choose(&mut self.rng)?;
        self.map.reserve(unit.neighbor(direction));
        tracing::debug!("Fallback move for {} towards {:?}", unit, direction);
        Some(Order::move_to(unit, direction))
    }

    // === Step 8: spawning ===

    fn plan_spawns(&mut self, plan: &mut TurnPlan) {
        let economy = &self.config.economy;
        let units = self.map.own_units().len();
        let quota =
            economy.units_per_base * self.map.own_bases().len() + self.roles.blocks.blocked_count();
        let per_player = self.map.resource_total() / plan.num_players.max(1) as Resources;

        if (units >= quota && !plan.wants_base) || per_player < economy.min_resources_per_player {
            return;
        }

        let bases: Vec<Coords> = self.map.own_bases().iter().copied().collect();
        for base in bases {
            let nearby = units_near(&self.map, base, self.config.spawn.nearby_radius);
            if !should_spawn(
                &self.map,
                base,
                nearby,
                plan.budget,
                &self.config.economy,
                &self.config.spawn,
            ) {
                continue;
            }
            match spawn_direction(&self.map, base) {
                Some(direction) => {
                    self.map.reserve(base.neighbor(direction));
                    plan.orders.push(Order::spawn(base, direction));
                    plan.budget -= self.config.economy.spawn_cost;
                    tracing::debug!("Spawning at {} towards {:?}", base, direction);
                }
                None => tracing::info!("Spawn at {} authorised but no free neighbour", base),
            }
        }
    }

    fn log_economy(&self, state: &GameState) {
        let units = self.map.own_units().len();
        tracing::info!(
            "Turn {}: {} units, {} bases, {:.2} resources/turn, depleted in {:?} turns",
            state.turn,
            units,
            self.map.own_bases().len(),
            estimate_resources_per_turn(&self.map, units),
            turns_until_depleted(&self.map)
        );
    }
}

impl TurnPolicy for Strategist {
    fn plan_turn(&mut self, state: &GameState, player: PlayerId) -> Vec<Order> {
        let mut plan = TurnPlan {
            orders: Vec::new(),
            claimed: BTreeSet::new(),
            budget: state.resources_of(player),
            num_players: state.num_players,
            wants_base: false,
        };

        self.update_knowledge(state, player);
        self.locate_roles(&mut plan);
        self.update_explorer(&mut plan);
        self.plan_build(&mut plan);
        self.plan_blocker(&mut plan);
        self.plan_saboteurs(&mut plan);
        self.plan_returns(&mut plan);
        self.plan_free_units(&mut plan);
        self.plan_spawns(&mut plan);
        self.log_economy(state);

        plan.orders
    }
}
