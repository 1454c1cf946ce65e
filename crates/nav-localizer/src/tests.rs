//! Unit tests for nav-localizer.

#[cfg(test)]
mod helpers {
    use std::sync::Arc;

    use nav_core::{AgentId, Vec2};
    use nav_mesh::{NavMesh, parse_nav_mesh};

    use crate::{AgentSnapshot, NavMeshLocalizer};

    /// Three 10×10 squares in a row along +x.
    pub const STRIP: &str = "\
8
0 0  10 0  20 0  30 0
0 10  10 10  20 10  30 10
2
1 5  0 1
2 6  1 2
0
strip 3
5 5    4 0 1 5 4   0 0 0   1 0     0
15 5   4 1 2 6 5   0 0 0   2 0 1   0
25 5   4 2 3 7 6   0 0 0   1 1     0
";

    /// A flat floor with a ramp (rising along +x) over the same footprint.
    pub const RAMP_OVER_FLOOR: &str = "\
8
0 0  10 0  10 10  0 10
0 0  10 0  10 10  0 10
0
0
ground 1
5 5   4 0 1 2 3   0 0 0     0   0
ramp 1
5 5   4 4 5 6 7   0.5 0 0   0   0
";

    pub fn mesh(text: &str) -> Arc<NavMesh> {
        Arc::new(parse_nav_mesh(text.as_bytes()).unwrap())
    }

    pub fn localizer(text: &str) -> NavMeshLocalizer {
        NavMeshLocalizer::new(mesh(text))
    }

    pub fn agent(id: u32, x: f32, y: f32) -> AgentSnapshot {
        AgentSnapshot::new(AgentId(id), Vec2::new(x, y), 0.5)
    }
}

// ── Location ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod location {
    use std::sync::Arc;

    use nav_core::{NodeId, Vec2};
    use nav_path::{AStarPlanner, Goal, PortalPath};

    use super::helpers::{STRIP, mesh};
    use crate::location::lock_path;
    use crate::{Corridor, Location};

    fn path() -> PortalPath {
        let planner = AStarPlanner::new(mesh(STRIP));
        PortalPath::plan(Vec2::new(2.0, 5.0), NodeId(0), Goal::fixed(Vec2::new(28.0, 5.0)), NodeId(2), 0.5, &planner)
            .unwrap()
    }

    #[test]
    fn default_is_unlocated() {
        let loc = Location::default();
        assert!(!loc.node().is_valid());
        assert!(!loc.is_path());
        assert!(loc.corridor().is_none());
    }

    #[test]
    fn path_location_reports_corridor_node() {
        let loc = Location::path(path());
        assert!(loc.is_path());
        assert_eq!(loc.node(), NodeId(0));
        let corridor = loc.corridor().unwrap();
        assert_eq!(lock_path(corridor.shared()).portal_count(), 2);
    }

    #[test]
    fn clear_path_keeps_node() {
        let mut loc = Location::path(path());
        loc.clear_path();
        assert!(!loc.is_path());
        assert_eq!(loc.node(), NodeId(0));
        // No-op on a bare node.
        loc.clear_path();
        assert_eq!(loc.node(), NodeId(0));
    }

    #[test]
    fn corridors_are_identified_by_handle() {
        let a = Corridor::new(path());
        let b = Corridor::new(path());
        let shared = Arc::clone(a.shared());
        assert!(a.is(&shared));
        assert!(!b.is(&shared));
        assert_eq!(lock_path(&shared).route().end, NodeId(2));
    }
}

// ── OccupancyIndex ─────────────────────────────────────────────────────────────

#[cfg(test)]
mod occupancy {
    use nav_core::{AgentId, NodeId};

    use crate::OccupancyIndex;

    #[test]
    fn relocate_moves_between_nodes() {
        let mut occ = OccupancyIndex::new(3);
        occ.relocate(AgentId(7), NodeId::INVALID, NodeId(0));
        occ.relocate(AgentId(3), NodeId::INVALID, NodeId(0));
        assert_eq!(occ.occupants(NodeId(0)), vec![AgentId(3), AgentId(7)]);

        occ.relocate(AgentId(7), NodeId(0), NodeId(2));
        assert_eq!(occ.occupants(NodeId(0)), vec![AgentId(3)]);
        assert_eq!(occ.occupants(NodeId(2)), vec![AgentId(7)]);
        assert_eq!(occ.total(), 2);

        occ.relocate(AgentId(7), NodeId(2), NodeId::INVALID);
        assert_eq!(occ.count(NodeId(2)), 0);
        assert_eq!(occ.total(), 1);
    }

    #[test]
    fn relocate_from_wrong_node_removes_stray_entry() {
        let mut occ = OccupancyIndex::new(3);
        occ.relocate(AgentId(1), NodeId::INVALID, NodeId(2));
        // The caller believes the agent is in node 0.
        occ.relocate(AgentId(1), NodeId(0), NodeId(1));
        assert!(!occ.contains(NodeId(2), AgentId(1)));
        assert!(occ.contains(NodeId(1), AgentId(1)));
        assert_eq!(occ.total(), 1);
    }

    #[test]
    fn unknown_node_is_empty() {
        let mut occ = OccupancyIndex::new(2);
        assert!(occ.occupants(NodeId(9)).is_empty());
        assert_eq!(occ.count(NodeId::INVALID), 0);
        assert!(!occ.remove(NodeId(9), AgentId(0)));
        assert_eq!(occ.evict(AgentId(0)), None);
    }
}

// ── Node tracking ──────────────────────────────────────────────────────────────

#[cfg(test)]
mod tracking {
    use nav_core::{AgentId, NodeId, Vec2};
    use nav_mesh::MeshError;

    use super::helpers::{RAMP_OVER_FLOOR, STRIP, agent, localizer};
    use crate::{LocalizerError, NavAgent};

    #[test]
    fn point_queries() {
        let loc = localizer(STRIP);
        assert_eq!(loc.find_node(Vec2::new(15.0, 5.0)), Some(NodeId(1)));
        assert_eq!(loc.find_node(Vec2::new(100.0, 100.0)), None);
        assert_eq!(loc.find_node_in_group(Vec2::new(25.0, 5.0), "strip", false), Some(NodeId(2)));
        assert_eq!(loc.find_node_in_group(Vec2::new(25.0, 5.0), "nope", false), None);
        assert_eq!(loc.find_node_in_group(Vec2::new(25.0, 5.0), "nope", true), Some(NodeId(2)));
    }

    #[test]
    fn bare_agents_move_only_when_forced() {
        let loc = localizer(STRIP);
        let a = agent(0, 5.0, 5.0);
        assert_eq!(loc.update_location(&a, false), None);
        assert_eq!(loc.node_of(a.id()), None);

        assert_eq!(loc.update_location(&a, true), Some(NodeId(0)));
        assert_eq!(loc.node_of(a.id()), Some(NodeId(0)));

        let moved = agent(0, 15.0, 5.0);
        assert_eq!(loc.update_location(&moved, false), Some(NodeId(0)));
        assert_eq!(loc.update_location(&moved, true), Some(NodeId(1)));
        assert!(loc.node_occupants(NodeId(0)).is_empty());
        assert_eq!(loc.node_occupants(NodeId(1)), vec![AgentId(0)]);
    }

    #[test]
    fn track_all_updates_every_agent() {
        let loc = localizer(STRIP);
        loc.set_track_all(true);
        assert!(loc.track_all());
        assert_eq!(loc.update_location(&agent(4, 5.0, 5.0), false), Some(NodeId(0)));
        assert_eq!(loc.update_location(&agent(4, 25.0, 5.0), false), Some(NodeId(2)));
        assert_eq!(loc.occupant_count(NodeId(2)), 1);
        assert!(loc.occupancy_consistent());
    }

    #[test]
    fn off_mesh_agent_keeps_last_node() {
        let loc = localizer(STRIP);
        loc.update_location(&agent(1, 5.0, 5.0), true);
        assert_eq!(loc.update_location(&agent(1, -5.0, 5.0), true), None);
        assert_eq!(loc.node_of(AgentId(1)), Some(NodeId(0)));
        assert_eq!(loc.node_occupants(NodeId(0)), vec![AgentId(1)]);
        assert!(loc.occupancy_consistent());
    }

    #[test]
    fn set_node_validates_and_moves_occupancy() {
        let loc = localizer(STRIP);
        loc.set_node(AgentId(2), NodeId(1)).unwrap();
        assert_eq!(loc.node_occupants(NodeId(1)), vec![AgentId(2)]);

        let err = loc.set_node(AgentId(2), NodeId(9)).unwrap_err();
        assert!(matches!(err, LocalizerError::Mesh(MeshError::NodeNotFound(NodeId(9)))));
        assert_eq!(loc.node_of(AgentId(2)), Some(NodeId(1)));

        loc.set_node(AgentId(2), NodeId(2)).unwrap();
        assert_eq!(loc.occupant_count(NodeId(1)), 0);
        assert_eq!(loc.occupant_count(NodeId(2)), 1);

        loc.set_node(AgentId(2), NodeId::INVALID).unwrap();
        assert_eq!(loc.node_of(AgentId(2)), None);
        assert_eq!(loc.occupant_count(NodeId(2)), 0);
        assert!(loc.occupancy_consistent());
    }

    #[test]
    fn remove_agent_clears_occupancy() {
        let loc = localizer(STRIP);
        loc.set_node(AgentId(5), NodeId(0)).unwrap();
        assert_eq!(loc.agent_count(), 1);
        assert_eq!(loc.remove_agent(AgentId(5)), Some(NodeId(0)));
        assert_eq!(loc.remove_agent(AgentId(5)), None);
        assert_eq!(loc.agent_count(), 0);
        assert!(loc.node_occupants(NodeId(0)).is_empty());
    }

    #[test]
    fn elevation_and_gradient_follow_tracked_node() {
        let loc = localizer(RAMP_OVER_FLOOR);
        let a = agent(0, 4.0, 5.0);
        assert_eq!(loc.elevation(&a), None);
        // Initial placement prefers the ramp above the floor.
        assert_eq!(loc.update_location(&a, true), Some(NodeId(1)));
        assert_eq!(loc.elevation(&a), Some(2.0));
        assert_eq!(loc.gradient(&a), Some(Vec2::new(0.5, 0.0)));

        loc.set_node(a.id(), NodeId(0)).unwrap();
        assert_eq!(loc.elevation(&a), Some(0.0));
        assert_eq!(loc.gradient(&a), Some(Vec2::ZERO));
        // Tracking from the floor stays on the floor.
        assert_eq!(loc.update_location(&agent(0, 6.0, 5.0), true), Some(NodeId(0)));
    }
}

// ── Corridors ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod corridors {
    use std::sync::Arc;

    use nav_core::{AgentId, NodeId, Vec2};
    use nav_mesh::MeshError;
    use nav_path::{AStarPlanner, Goal, PathUpdate, PortalPath};

    use super::helpers::{RAMP_OVER_FLOOR, STRIP, agent, localizer, mesh};
    use crate::{LocalizerError, NavAgent, NavMeshLocalizer};

    #[test]
    fn set_path_rejects_node_outside_mesh() {
        let strip = mesh(STRIP);
        let planner = AStarPlanner::new(Arc::clone(&strip));
        let path =
            PortalPath::plan(Vec2::new(25.0, 5.0), NodeId(2), Goal::fixed(Vec2::new(2.0, 5.0)), NodeId(0), 0.5, &planner)
                .unwrap();

        let small = localizer(RAMP_OVER_FLOOR);
        let err = small.set_path(AgentId(0), path.clone()).unwrap_err();
        assert!(matches!(err, LocalizerError::Mesh(MeshError::NodeNotFound(NodeId(2)))));
        assert_eq!(small.agent_count(), 0);
        assert!(small.occupancy_consistent());

        let loc = NavMeshLocalizer::new(strip);
        loc.set_path(AgentId(0), path).unwrap();
        assert!(loc.has_path(AgentId(0)));
        assert_eq!(loc.node_occupants(NodeId(2)), vec![AgentId(0)]);
    }

    #[test]
    fn given_planner_is_kept() {
        let strip = mesh(STRIP);
        let planner: Arc<dyn nav_path::Planner> = Arc::new(AStarPlanner::new(Arc::clone(&strip)));
        let loc = NavMeshLocalizer::with_planner(strip, Arc::clone(&planner));
        assert!(Arc::ptr_eq(loc.planner().unwrap(), &planner));
        assert!(!loc.set_planner(Arc::new(AStarPlanner::new(Arc::clone(loc.mesh())))));
        assert!(Arc::ptr_eq(loc.ensure_planner(), &planner));
        assert!(format!("{loc:?}").contains("has_planner: true"));

        let bare = localizer(STRIP);
        assert!(bare.planner().is_none());
        assert!(format!("{bare:?}").contains("has_planner: false"));
    }

    #[test]
    fn plan_path_enters_path_state() {
        let loc = localizer(STRIP);
        let a = agent(0, 2.0, 5.0);
        assert!(loc.plan_path(&a, Goal::fixed(Vec2::new(28.0, 5.0))).unwrap());
        assert!(loc.has_path(a.id()));
        assert_eq!(loc.path_agent_count(), 1);
        assert_eq!(loc.node_of(a.id()), Some(NodeId(0)));
        assert_eq!(loc.route_of(a.id()).unwrap().portal_count(), 2);
        assert_eq!(loc.node_occupants(NodeId(0)), vec![AgentId(0)]);
        assert!(loc.planner().is_some());
    }

    #[test]
    fn goal_in_own_node_needs_no_corridor() {
        let loc = localizer(STRIP);
        let a = agent(0, 2.0, 5.0);
        assert!(!loc.plan_path(&a, Goal::fixed(Vec2::new(8.0, 5.0))).unwrap());
        assert!(!loc.has_path(a.id()));
        assert_eq!(loc.node_of(a.id()), Some(NodeId(0)));
    }

    #[test]
    fn planning_errors() {
        let loc = localizer(STRIP);
        let off = agent(0, -5.0, 5.0);
        assert!(matches!(
            loc.plan_path(&off, Goal::fixed(Vec2::new(28.0, 5.0))),
            Err(LocalizerError::NotLocated(AgentId(0)))
        ));
        let a = agent(1, 2.0, 5.0);
        assert!(matches!(
            loc.plan_path(&a, Goal::fixed(Vec2::new(50.0, 5.0))),
            Err(LocalizerError::GoalOffMesh(_))
        ));
        let wide = crate::AgentSnapshot::new(AgentId(2), Vec2::new(2.0, 5.0), 6.0);
        assert!(matches!(
            loc.plan_path(&wide, Goal::fixed(Vec2::new(28.0, 5.0))),
            Err(LocalizerError::Path(_))
        ));
        assert!(!loc.has_path(AgentId(2)));
    }

    #[test]
    fn path_agents_are_tracked_along_corridor() {
        let loc = localizer(STRIP);
        loc.plan_path(&agent(0, 2.0, 5.0), Goal::fixed(Vec2::new(28.0, 5.0))).unwrap();
        // Path agents update without `force`.
        assert_eq!(loc.update_location(&agent(0, 12.0, 5.0), false), Some(NodeId(1)));
        assert_eq!(loc.node_occupants(NodeId(1)), vec![AgentId(0)]);
        assert!(loc.node_occupants(NodeId(0)).is_empty());
        assert_eq!(loc.update_location(&agent(0, 26.0, 5.0), false), Some(NodeId(2)));
        assert!(loc.has_path(AgentId(0)));
        assert!(loc.occupancy_consistent());

        assert!(loc.clear_path(AgentId(0)));
        assert!(!loc.clear_path(AgentId(0)));
        assert_eq!(loc.node_of(AgentId(0)), Some(NodeId(2)));
        assert_eq!(loc.occupant_count(NodeId(2)), 1);
    }

    #[test]
    fn path_agent_off_mesh() {
        let loc = localizer(STRIP);
        loc.plan_path(&agent(0, 2.0, 5.0), Goal::fixed(Vec2::new(28.0, 5.0))).unwrap();
        assert_eq!(loc.update_location(&agent(0, 2.0, -3.0), false), None);
        assert!(loc.has_path(AgentId(0)));
        assert_eq!(loc.node_of(AgentId(0)), Some(NodeId(0)));
    }

    #[test]
    fn unchanged_goal_keeps_route() {
        let loc = localizer(STRIP);
        let a = agent(0, 2.0, 5.0);
        loc.plan_path(&a, Goal::moving(Vec2::new(28.0, 5.0))).unwrap();
        let before = loc.route_of(a.id()).unwrap();
        assert_eq!(loc.update_path_for_goal(&a, Vec2::new(28.0, 5.0)).unwrap(), PathUpdate::Unchanged);
        assert!(Arc::ptr_eq(&before, &loc.route_of(a.id()).unwrap()));
    }

    #[test]
    fn moving_goal_adjusts_or_replans() {
        let loc = localizer(STRIP);
        let a = agent(0, 2.0, 5.0);
        loc.plan_path(&a, Goal::moving(Vec2::new(28.0, 5.0))).unwrap();
        let before = loc.route_of(a.id()).unwrap();

        assert_eq!(loc.update_path_for_goal(&a, Vec2::new(27.0, 7.0)).unwrap(), PathUpdate::Adjusted);
        assert!(Arc::ptr_eq(&before, &loc.route_of(a.id()).unwrap()));

        assert_eq!(loc.update_path_for_goal(&a, Vec2::new(15.0, 5.0)).unwrap(), PathUpdate::Replanned);
        let after = loc.route_of(a.id()).unwrap();
        assert_eq!(after.end, NodeId(1));
        assert_eq!(after.portal_count(), 1);
    }

    #[test]
    fn unreachable_goal_drops_corridor() {
        let loc = localizer(STRIP);
        let a = agent(0, 2.0, 5.0);
        loc.plan_path(&a, Goal::moving(Vec2::new(28.0, 5.0))).unwrap();
        assert_eq!(loc.update_path_for_goal(&a, Vec2::new(80.0, 5.0)).unwrap(), PathUpdate::Unreachable);
        assert!(!loc.has_path(a.id()));
        assert_eq!(loc.node_of(a.id()), Some(NodeId(0)));
        assert!(matches!(
            loc.update_path_for_goal(&a, Vec2::new(28.0, 5.0)),
            Err(LocalizerError::NoPath(AgentId(0)))
        ));
    }

    #[test]
    fn steering_queries() {
        let loc = localizer(STRIP);
        let a = agent(0, 2.0, 5.0);
        assert_eq!(loc.corridor_target(&a).unwrap(), None);
        assert!(loc.preferred_direction(&a, 0.9).is_none());

        loc.plan_path(&a, Goal::fixed(Vec2::new(28.0, 5.0))).unwrap();
        let target = loc.corridor_target(&a).unwrap().unwrap();
        assert!(target.distance(Vec2::new(10.0, 5.0)) < 1e-4);
        let steering = loc.preferred_direction(&a, 0.9).unwrap();
        assert!(steering.direction.distance(Vec2::X) < 1e-4);
        assert!(loc.has_path(a.id()));
    }
}

// ── Concurrency ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod concurrency {
    use std::sync::atomic::{AtomicBool, Ordering};

    use nav_core::{AgentId, NodeId, Vec2};
    use nav_path::Goal;
    use rayon::prelude::*;

    use super::helpers::{STRIP, agent, localizer};
    use crate::{AgentSnapshot, NavAgent};

    fn expected(a: &AgentSnapshot) -> NodeId {
        NodeId((a.position.x / 10.0) as u32)
    }

    #[test]
    fn parallel_updates_keep_occupancy_consistent() {
        let loc = localizer(STRIP);
        let agents: Vec<AgentSnapshot> =
            (0..400).map(|i| agent(i, 0.3 + (i % 100) as f32 * 0.29, 5.0)).collect();

        let found: Vec<_> = agents.par_iter().map(|a| loc.update_location(a, true)).collect();
        for (a, node) in agents.iter().zip(found) {
            assert_eq!(node, Some(expected(a)), "agent {}", a.id());
        }
        assert!(loc.occupancy_consistent());

        // Mirror everyone across the strip while reading occupancy.
        let moved: Vec<AgentSnapshot> = agents
            .iter()
            .map(|a| AgentSnapshot::new(a.id, Vec2::new(30.0 - a.position.x, 5.0), a.radius))
            .collect();
        moved.par_iter().for_each(|a| {
            loc.update_location(a, true);
            let _ = loc.node_occupants(expected(a));
        });
        for a in &moved {
            assert_eq!(loc.node_of(a.id()), Some(expected(a)));
        }
        let total: usize = (0..3).map(|n| loc.occupant_count(NodeId(n))).sum();
        assert_eq!(total, 400);
        assert!(loc.occupancy_consistent());
    }

    #[test]
    fn readers_always_see_corridor_during_tracking() {
        let loc = localizer(STRIP);
        loc.plan_path(&agent(0, 2.0, 5.0), Goal::fixed(Vec2::new(28.0, 5.0))).unwrap();
        let done = AtomicBool::new(false);

        std::thread::scope(|s| {
            s.spawn(|| {
                // Step back and forth across the first portal.
                for i in 0..20_000 {
                    let a = agent(0, if i % 2 == 0 { 12.0 } else { 4.0 }, 5.0);
                    loc.update_location(&a, false);
                    loc.preferred_direction(&a, 0.9);
                }
                done.store(true, Ordering::Release);
            });

            let mut reads = 0;
            while !done.load(Ordering::Acquire) || reads < 1_000 {
                assert!(loc.has_path(AgentId(0)));
                assert!(loc.route_of(AgentId(0)).is_some());
                assert_eq!(loc.path_agent_count(), 1);
                assert!(loc.occupancy_consistent());
                reads += 1;
            }
        });
        assert_eq!(loc.node_of(AgentId(0)), Some(NodeId(0)));
    }

    #[test]
    fn parallel_corridors_share_routes() {
        let loc = localizer(STRIP);
        let agents: Vec<AgentSnapshot> = (0..64).map(|i| agent(i, 2.0 + (i % 8) as f32, 5.0)).collect();
        agents.par_iter().for_each(|a| {
            assert!(loc.plan_path(a, Goal::fixed(Vec2::new(28.0, 5.0))).unwrap());
        });
        assert_eq!(loc.path_agent_count(), 64);

        let stepped: Vec<_> = agents
            .par_iter()
            .map(|a| loc.update_location(&AgentSnapshot::new(a.id, Vec2::new(15.0, 5.0), a.radius), false))
            .collect();
        assert!(stepped.iter().all(|n| *n == Some(NodeId(1))));
        assert_eq!(loc.occupant_count(NodeId(1)), 64);
        assert!(loc.occupancy_consistent());
    }
}

// ── Proximity ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod proximity {
    use nav_core::{AgentId, Vec2};

    use super::helpers::{STRIP, agent, localizer};
    use crate::{AgentSnapshot, NavMeshLocalizer};

    /// Three 10×10 squares bent into an L: (0,0)–(10,10), (10,0)–(20,10),
    /// then north to (10,10)–(20,20).
    const ELL: &str = "\
8
0 0  10 0  20 0  0 10  10 10  20 10  10 20  20 20
2
1 4  0 1
4 5  1 2
0
ell 3
5 5     4 0 1 4 3   0 0 0   1 0     0
15 5    4 1 2 5 4   0 0 0   2 0 1   0
15 15   4 4 5 7 6   0 0 0   1 1     0
";

    fn place(loc: &NavMeshLocalizer, agents: &[AgentSnapshot]) {
        for a in agents {
            loc.update_location(a, true).unwrap();
        }
    }

    fn positions(agents: &[AgentSnapshot]) -> impl Fn(AgentId) -> Option<Vec2> + '_ {
        move |id| agents.get(id.index()).map(|a| a.position)
    }

    #[test]
    fn neighbors_in_range_nearest_first() {
        let loc = localizer(STRIP);
        let agents = [agent(0, 8.0, 5.0), agent(1, 12.0, 5.0), agent(2, 25.0, 5.0), agent(3, 5.0, 5.0)];
        place(&loc, &agents);

        let near = loc.agents_near(&agents[0], 5.0, positions(&agents));
        assert_eq!(near, vec![(AgentId(3), 9.0), (AgentId(1), 16.0)]);

        let far = loc.agents_near(&agents[0], 20.0, positions(&agents));
        let ids: Vec<_> = far.iter().map(|&(id, _)| id).collect();
        assert_eq!(ids, vec![AgentId(3), AgentId(1), AgentId(2)]);
    }

    #[test]
    fn agents_around_a_corner_are_hidden() {
        let loc = localizer(ELL);
        let agents = [agent(0, 2.0, 2.0), agent(1, 18.0, 12.0), agent(2, 11.0, 19.0), agent(3, 15.0, 5.0)];
        place(&loc, &agents);

        let near = loc.agents_near(&agents[0], 20.0, positions(&agents));
        assert_eq!(near, vec![(AgentId(3), 178.0), (AgentId(1), 356.0)]);
    }

    #[test]
    fn unknown_positions_and_unlocated_agents() {
        let loc = localizer(STRIP);
        let agents = [agent(0, 8.0, 5.0), agent(1, 9.0, 5.0)];
        place(&loc, &agents);

        assert!(loc.agents_near(&agents[0], 5.0, |_| None).is_empty());
        assert!(loc.agents_near(&agent(7, 8.0, 5.0), 5.0, positions(&agents)).is_empty());
    }
}

// ── Resource loading ───────────────────────────────────────────────────────────

#[cfg(test)]
mod resource {
    use std::io::Write;
    use std::sync::Arc;

    use nav_core::ResourceRegistry;
    use nav_mesh::load_nav_mesh_in;

    use super::helpers::STRIP;
    use crate::{LocalizerError, load_localizer_in};

    #[test]
    fn localizers_are_shared_per_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(STRIP.as_bytes()).unwrap();
        let registry = ResourceRegistry::new();

        let a = load_localizer_in(&registry, file.path(), false).unwrap();
        assert!(a.planner().is_none());
        let b = load_localizer_in(&registry, file.path(), true).unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert!(a.planner().is_some());

        let mesh = load_nav_mesh_in(&registry, file.path()).unwrap();
        assert!(Arc::ptr_eq(a.mesh(), &mesh));
        assert_eq!(registry.live_count(), 2);
    }

    #[test]
    fn missing_file_is_an_error() {
        let registry = ResourceRegistry::new();
        let dir = tempfile::tempdir().unwrap();
        let err = load_localizer_in(&registry, &dir.path().join("missing.nav"), true).unwrap_err();
        assert!(matches!(err, LocalizerError::Mesh(_)));
        assert_eq!(registry.live_count(), 0);
    }
}
