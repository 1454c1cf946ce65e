//! Unit tests for nav-path.

#[cfg(test)]
mod helpers {
    use std::sync::Arc;

    use nav_mesh::{NavMesh, parse_nav_mesh};

    use crate::AStarPlanner;

    /// Two 10×10 squares sharing the portal (0,0)–(0,10); node 1 is west.
    pub const TWO_NODE: &str = "\
6
0 0  10 0  10 10  0 10  -10 0  -10 10
1
0 3  0 1
0
floor 2
5 5    4 0 1 2 3    0 0 0   1 0   0
-5 5   4 4 0 3 5    0 0 0   1 0   0
";

    /// Three squares in a row along +x, x in [0, 30].
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

    /// An L: node 0 west, node 1 east, node 2 north of node 1.  The inner
    /// corner is (10,10).
    pub const L_SHAPE: &str = "\
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

    /// Nodes 0 and 1 side by side, joined by a 2-wide door at x = 10
    /// (y in [4, 6]); node 2 spans the top of both with 10-wide portals.
    pub const FORK: &str = "\
10
0 0  10 0  20 0  10 4  10 6  0 10  10 10  20 10  0 20  20 20
3
3 4  0 1
5 6  0 2
6 7  1 2
0
fork 3
5 5     6 0 1 3 4 6 5    0 0 0   2 0 1   0
15 5    6 1 2 7 6 4 3    0 0 0   2 0 2   0
10 15   5 5 6 7 9 8      0 0 0   2 1 2   0
";

    pub fn mesh(text: &str) -> Arc<NavMesh> {
        Arc::new(parse_nav_mesh(text.as_bytes()).unwrap())
    }

    pub fn planner(text: &str) -> (Arc<NavMesh>, AStarPlanner) {
        let mesh = mesh(text);
        let planner = AStarPlanner::new(Arc::clone(&mesh));
        (mesh, planner)
    }

    pub fn close(a: nav_core::Vec2, b: nav_core::Vec2) -> bool {
        a.distance(b) < 1e-3
    }
}

// ── Portal geometry ────────────────────────────────────────────────────────────

#[cfg(test)]
mod portal {
    use nav_core::{EdgeId, NodeId, Vec2};

    use super::helpers::{TWO_NODE, close, mesh};
    use crate::{PathError, Portal, WayPortal};

    fn door() -> Portal {
        Portal::new(Vec2::new(0.0, 0.0), Vec2::new(0.0, 10.0))
    }

    #[test]
    fn interior_projection() {
        let p = door().nearest_point(Vec2::new(-5.0, 5.0), 1.0).unwrap();
        assert!(close(p, Vec2::new(0.0, 5.0)));
        let p = door().nearest_point(Vec2::new(3.0, 7.0), 1.0).unwrap();
        assert!(close(p, Vec2::new(0.0, 7.0)));
    }

    #[test]
    fn from_mesh_edge() {
        let mesh = mesh(TWO_NODE);
        let portal = Portal::from_edge(mesh.edge(EdgeId(0)));
        assert_eq!(portal.length, 10.0);
        let p = portal.nearest_point(Vec2::new(-5.0, 5.0), 1.0).unwrap();
        assert!(close(p, Vec2::new(0.0, 5.0)));
        assert!(close(portal.midpoint(), Vec2::new(0.0, 5.0)));
    }

    #[test]
    fn too_wide_agent_is_an_error() {
        let err = door().nearest_point(Vec2::new(-5.0, 5.0), 6.0).unwrap_err();
        assert!(matches!(err, PathError::PortalTooNarrow { radius, .. } if radius == 6.0));
        assert!(door().nearest_point(Vec2::new(-5.0, 5.0), 5.0).is_err());
    }

    #[test]
    fn tangent_point_near_end() {
        let pos = Vec2::new(-3.0, -4.0);
        let p = door().nearest_point(pos, 1.0).unwrap();
        assert!((p.length() - 1.0).abs() < 1e-4, "on the radius circle: {p}");
        assert!(p.y > 0.0, "on the interior side: {p}");
        // The line from the agent touches the circle at p.
        assert!((pos - p).dot(p).abs() < 1e-3);
    }

    #[test]
    fn deep_overlap_steps_inward() {
        let p = door().nearest_point(Vec2::new(0.2, 0.3), 1.0).unwrap();
        assert!(close(p, Vec2::new(0.2, 1.3)));
        let p = door().nearest_point(Vec2::new(0.0, 9.5), 1.0).unwrap();
        assert!(close(p, Vec2::new(0.0, 8.5)));
    }

    #[test]
    fn nearest_point_keeps_clearance() {
        let portal = door();
        let r = 1.0;
        for ix in -10..=10 {
            for iy in -20..=40 {
                let pos = Vec2::new(ix as f32 * 0.5, iy as f32 * 0.5);
                if pos.distance(portal.p0) <= r || pos.distance(portal.p1) <= r {
                    continue;
                }
                let p = portal.nearest_point(pos, r).unwrap();
                assert!(p.distance(portal.p0) >= r - 1e-4, "{pos} -> {p}");
                assert!(p.distance(portal.p1) >= r - 1e-4, "{pos} -> {p}");
            }
        }
    }

    #[test]
    fn way_portal_orientation() {
        let mesh = mesh(TWO_NODE);
        let edge = mesh.edge(EdgeId(0));
        // Heading west (node 0 → node 1) the south end is on the right.
        let west = WayPortal::new(edge, EdgeId(0), NodeId(0));
        assert_eq!(west.left, Vec2::new(0.0, 0.0));
        // Heading east the north end is on the left.
        let east = WayPortal::new(edge, EdgeId(0), NodeId(1));
        assert_eq!(east.left, Vec2::new(0.0, 10.0));
        assert!(close(east.left(1.0), Vec2::new(0.0, 9.0)));
        assert!(close(east.right(1.0), Vec2::new(0.0, 1.0)));
    }

    #[test]
    fn intersections_and_clearance() {
        let mesh = mesh(TWO_NODE);
        let east = WayPortal::new(mesh.edge(EdgeId(0)), EdgeId(0), NodeId(1));
        assert!(close(east.intersection_point(Vec2::new(-5.0, 5.0), Vec2::X), Vec2::new(0.0, 5.0)));
        // Parallel lines fall back to the projection.
        assert!(close(east.intersection_point(Vec2::new(-5.0, 3.0), Vec2::Y), Vec2::new(0.0, 3.0)));

        assert!(east.clearance_parameter(Vec2::new(0.0, 9.0), 1.0).abs() < 1e-5);
        assert!((east.clearance_parameter(Vec2::new(0.0, 1.0), 1.0) - 1.0).abs() < 1e-5);
        assert!(close(east.clear_point(0.5, 1.0), Vec2::new(0.0, 5.0)));
        let s = east.clearance_parameter_line(Vec2::new(5.0, 5.0), Vec2::new(-5.0, 5.0), 1.0);
        assert!((s - 0.5).abs() < 1e-5);
    }
}

// ── Planner ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod planner {
    use std::sync::Arc;

    use nav_core::{EdgeId, NodeId};
    use nav_mesh::MeshError;

    use super::helpers::{FORK, STRIP, TWO_NODE, planner};
    use crate::{PathError, Planner};

    #[test]
    fn two_node_route_has_one_portal() {
        let (_, planner) = planner(TWO_NODE);
        let route = planner.route(NodeId(1), NodeId(0), 2.0).unwrap();
        assert_eq!(route.portal_count(), 1);
        assert_eq!(route.portals[0].node, NodeId(1));
        assert_eq!(route.nodes().collect::<Vec<_>>(), vec![NodeId(1), NodeId(0)]);
        assert_eq!(route.max_width, 10.0);
    }

    #[test]
    fn too_wide_agent_has_no_route() {
        let (_, planner) = planner(TWO_NODE);
        let err = planner.route(NodeId(1), NodeId(0), 12.0).unwrap_err();
        assert!(matches!(err, PathError::NoRoute { from: NodeId(1), to: NodeId(0) }));
    }

    #[test]
    fn same_node_is_trivial() {
        let (_, planner) = planner(STRIP);
        let route = planner.route(NodeId(2), NodeId(2), 1.0).unwrap();
        assert_eq!(route.portal_count(), 0);
        assert_eq!(route.node_at(0), NodeId(2));
        assert!(route.admits(1_000.0));
    }

    #[test]
    fn unknown_node_is_an_error() {
        let (_, planner) = planner(STRIP);
        let err = planner.route(NodeId(0), NodeId(7), 1.0).unwrap_err();
        assert!(matches!(err, PathError::Mesh(MeshError::NodeNotFound(NodeId(7)))));
    }

    #[test]
    fn strip_route_in_order() {
        let (_, planner) = planner(STRIP);
        let route = planner.route(NodeId(0), NodeId(2), 2.0).unwrap();
        let edges: Vec<_> = route.portals.iter().map(|p| p.edge).collect();
        assert_eq!(edges, vec![EdgeId(0), EdgeId(1)]);
        assert!((route.length - 20.0).abs() < 1e-4);
    }

    #[test]
    fn narrow_door_is_skipped_by_wide_agents() {
        let (_, planner) = planner(FORK);
        let narrow = planner.route(NodeId(0), NodeId(1), 1.0).unwrap();
        assert_eq!(narrow.portal_count(), 1);
        assert_eq!(narrow.portals[0].edge, EdgeId(0));

        let wide = planner.route(NodeId(0), NodeId(1), 2.0).unwrap();
        let edges: Vec<_> = wide.portals.iter().map(|p| p.edge).collect();
        assert_eq!(edges, vec![EdgeId(1), EdgeId(2)]);
        assert!(wide.length > narrow.length);

        assert!(planner.route(NodeId(0), NodeId(1), 12.0).is_err());
    }

    #[test]
    fn cache_reuses_routes() {
        let (_, planner) = planner(FORK);
        let a = planner.route(NodeId(0), NodeId(1), 1.0).unwrap();
        let b = planner.route(NodeId(0), NodeId(1), 1.0).unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        // Within 5 % of the planned width.
        let c = planner.route(NodeId(0), NodeId(1), 1.02).unwrap();
        assert!(Arc::ptr_eq(&a, &c));
        assert_eq!(planner.cached_route_count(), 1);

        let wide = planner.route(NodeId(0), NodeId(1), 4.0).unwrap();
        assert!(!Arc::ptr_eq(&a, &wide));
        assert_eq!(planner.cached_route_count(), 2);

        // A narrower request replans, finds the same route and shares it.
        let d = planner.route(NodeId(0), NodeId(1), 0.5).unwrap();
        assert!(Arc::ptr_eq(&a, &d));
        assert_eq!(planner.cached_route_count(), 2);

        planner.clear_cache();
        assert_eq!(planner.cached_route_count(), 0);
    }

    #[test]
    fn concurrent_requests_share_one_route() {
        use rayon::prelude::*;

        let (_, planner) = planner(STRIP);
        let routes: Vec<_> = (0..64)
            .into_par_iter()
            .map(|_| planner.route(NodeId(0), NodeId(2), 2.0).unwrap())
            .collect();
        assert!(routes.iter().all(|r| r.is_equivalent(&routes[0])));
        assert_eq!(planner.cached_route_count(), 1);
    }
}

// ── Funnel ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod funnel {
    use nav_core::{NodeId, Vec2};

    use super::helpers::{L_SHAPE, STRIP, close, planner};
    use crate::{Goal, Planner, PortalPath};

    #[test]
    fn straight_corridor_crosses_in_line() {
        let (_, planner) = planner(STRIP);
        let route = planner.route(NodeId(0), NodeId(2), 2.0).unwrap();
        let path = PortalPath::new(Vec2::new(2.0, 5.0), Goal::fixed(Vec2::new(28.0, 5.0)), route, 1.0);
        assert!(close(path.waypoint(0).unwrap(), Vec2::new(10.0, 5.0)));
        assert!(close(path.waypoint(1).unwrap(), Vec2::new(20.0, 5.0)));
        assert!(close(path.heading(0).unwrap(), Vec2::X));
    }

    #[test]
    fn corner_is_cut_at_radius() {
        let (_, planner) = planner(L_SHAPE);
        let route = planner.route(NodeId(0), NodeId(2), 2.0).unwrap();
        let path = PortalPath::new(Vec2::new(5.0, 5.0), Goal::fixed(Vec2::new(15.0, 15.0)), route, 1.0);
        assert!(close(path.waypoint(0).unwrap(), Vec2::new(10.0, 9.0)), "{:?}", path.waypoint(0));
        assert!(close(path.waypoint(1).unwrap(), Vec2::new(11.0, 10.0)), "{:?}", path.waypoint(1));
        let h = path.heading(1).unwrap();
        assert!(close(h, Vec2::new(1.0, 1.0).normalize()));
    }
}

// ── PortalPath tracking ────────────────────────────────────────────────────────

#[cfg(test)]
mod path {
    use std::sync::Arc;

    use nav_core::{NodeId, Vec2};

    use super::helpers::{FORK, L_SHAPE, STRIP, TWO_NODE, close, planner};
    use crate::{Goal, PathError, PathUpdate, Planner, PortalPath};

    fn strip_path() -> (Arc<nav_mesh::NavMesh>, crate::AStarPlanner, PortalPath) {
        let (mesh, planner) = planner(STRIP);
        let path = PortalPath::plan(
            Vec2::new(2.0, 5.0),
            NodeId(0),
            Goal::moving(Vec2::new(28.0, 5.0)),
            NodeId(2),
            1.0,
            &planner,
        )
        .unwrap();
        (mesh, planner, path)
    }

    #[test]
    fn two_node_corridor_targets_portal_midpoint() {
        let (_, planner) = planner(TWO_NODE);
        let path =
            PortalPath::plan(Vec2::new(-5.0, 5.0), NodeId(1), Goal::fixed(Vec2::new(5.0, 5.0)), NodeId(0), 1.0, &planner)
                .unwrap();
        assert_eq!(path.portal_count(), 1);
        assert_eq!(path.node(), NodeId(1));
        let target = path.target_point(Vec2::new(-5.0, 5.0), 1.0).unwrap();
        assert!(close(target, Vec2::new(0.0, 5.0)));
    }

    #[test]
    fn radius_too_large_for_portal() {
        let (_, planner) = planner(TWO_NODE);
        let route = planner.route(NodeId(1), NodeId(0), 2.0).unwrap();
        let path = PortalPath::new(Vec2::new(-5.0, 5.0), Goal::fixed(Vec2::new(5.0, 5.0)), route, 1.0);
        assert!(matches!(
            path.target_point(Vec2::new(-5.0, 5.0), 6.0),
            Err(PathError::PortalTooNarrow { .. })
        ));
        assert!(PortalPath::plan(
            Vec2::new(-5.0, 5.0),
            NodeId(1),
            Goal::fixed(Vec2::new(5.0, 5.0)),
            NodeId(0),
            6.0,
            &planner
        )
        .is_err());
    }

    #[test]
    fn advances_and_backs_up() {
        let (mesh, planner, mut path) = strip_path();
        let step = |path: &mut PortalPath, x: f32| path.update_location(Vec2::new(x, 5.0), 1.0, &mesh, &planner).unwrap();

        assert_eq!(step(&mut path, 5.0), Some(NodeId(0)));
        assert_eq!(path.current_portal_index(), 0);
        assert_eq!(step(&mut path, 12.0), Some(NodeId(1)));
        assert_eq!(path.current_portal_index(), 1);
        assert_eq!(step(&mut path, 8.0), Some(NodeId(0)));
        assert_eq!(path.current_portal_index(), 0);
        assert_eq!(step(&mut path, 12.0), Some(NodeId(1)));
        assert_eq!(step(&mut path, 25.0), Some(NodeId(2)));
        assert!(path.is_finished());
        assert_eq!(path.target_point(Vec2::new(25.0, 5.0), 1.0).unwrap(), Vec2::new(28.0, 5.0));
    }

    #[test]
    fn jump_to_goal_node() {
        let (mesh, planner, mut path) = strip_path();
        let node = path.update_location(Vec2::new(25.0, 5.0), 1.0, &mesh, &planner).unwrap();
        assert_eq!(node, Some(NodeId(2)));
        assert!(path.is_finished());
    }

    #[test]
    fn off_mesh_keeps_path() {
        let (mesh, planner, mut path) = strip_path();
        let before = Arc::clone(path.route());
        let node = path.update_location(Vec2::new(-5.0, 5.0), 1.0, &mesh, &planner).unwrap();
        assert_eq!(node, None);
        assert_eq!(path.node(), NodeId(0));
        assert!(Arc::ptr_eq(&before, path.route()));
    }

    #[test]
    fn sideways_step_replans() {
        let (mesh, planner) = planner(FORK);
        let mut path =
            PortalPath::plan(Vec2::new(5.0, 5.0), NodeId(0), Goal::fixed(Vec2::new(15.0, 5.0)), NodeId(1), 0.5, &planner)
                .unwrap();
        assert_eq!(path.portal_count(), 1);
        let node = path.update_location(Vec2::new(10.0, 15.0), 0.5, &mesh, &planner).unwrap();
        assert_eq!(node, Some(NodeId(2)));
        assert_eq!(path.node(), NodeId(2));
        assert_eq!(path.route().start, NodeId(2));
        assert_eq!(path.end_node(), NodeId(1));
    }

    #[test]
    fn non_adjacent_jump_searches_blind() {
        let (mesh, planner) = planner(L_SHAPE);
        let mut path =
            PortalPath::plan(Vec2::new(5.0, 5.0), NodeId(0), Goal::fixed(Vec2::new(15.0, 5.0)), NodeId(1), 1.0, &planner)
                .unwrap();
        let node = path.update_location(Vec2::new(15.0, 15.0), 1.0, &mesh, &planner).unwrap();
        assert_eq!(node, Some(NodeId(2)));
        assert_eq!(path.route().start, NodeId(2));
        assert_eq!(path.portal_count(), 1);
    }

    #[test]
    fn steering_follows_waypoints() {
        let (_, _, mut path) = strip_path();
        let s = path.preferred_direction(Vec2::new(2.0, 5.0), 1.0, 0.9);
        assert!(close(s.target, Vec2::new(10.0, 5.0)));
        assert!(close(s.direction, Vec2::X));
    }

    #[test]
    fn steering_recomputes_funnel_after_deviation() {
        let (_, _, mut path) = strip_path();
        let s = path.preferred_direction(Vec2::new(8.0, 9.5), 1.0, 0.9);
        assert!(close(s.target, Vec2::new(10.0, 9.0)), "{}", s.target);
        assert!((s.direction.length() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn steering_toward_goal_when_finished() {
        let (mesh, planner, mut path) = strip_path();
        path.update_location(Vec2::new(25.0, 5.0), 1.0, &mesh, &planner).unwrap();
        let s = path.preferred_direction(Vec2::new(25.0, 5.0), 1.0, 0.9);
        assert_eq!(s.target, Vec2::new(28.0, 5.0));
        assert!(close(s.direction, Vec2::X));
    }

    #[test]
    fn unchanged_goal_keeps_route() {
        let (mesh, planner, mut path) = strip_path();
        let before = Arc::clone(path.route());
        let update = path.update_goal(Vec2::new(2.0, 5.0), 1.0, Vec2::new(28.0, 5.0), &mesh, &planner).unwrap();
        assert_eq!(update, PathUpdate::Unchanged);
        assert!(Arc::ptr_eq(&before, path.route()));
    }

    #[test]
    fn goal_moving_within_node_adjusts_last_crossing() {
        let (mesh, planner, mut path) = strip_path();
        let before = Arc::clone(path.route());
        let update = path.update_goal(Vec2::new(2.0, 5.0), 1.0, Vec2::new(28.0, 8.0), &mesh, &planner).unwrap();
        assert_eq!(update, PathUpdate::Adjusted);
        assert!(Arc::ptr_eq(&before, path.route()));
        assert!(close(path.waypoint(0).unwrap(), Vec2::new(10.0, 5.0)));
        let last = path.waypoint(1).unwrap();
        assert!(close(last, Vec2::new(20.0, 5.0 + 30.0 / 18.0)), "{last}");
    }

    #[test]
    fn goal_changing_node_replans() {
        let (mesh, planner, mut path) = strip_path();
        let before = Arc::clone(path.route());
        let update = path.update_goal(Vec2::new(2.0, 5.0), 1.0, Vec2::new(15.0, 5.0), &mesh, &planner).unwrap();
        assert_eq!(update, PathUpdate::Replanned);
        assert!(!Arc::ptr_eq(&before, path.route()));
        assert_eq!(path.end_node(), NodeId(1));
        assert_eq!(path.portal_count(), 1);
        assert_eq!(path.goal().position, Vec2::new(15.0, 5.0));
    }

    #[test]
    fn goal_off_mesh_is_unreachable() {
        let (mesh, planner, mut path) = strip_path();
        let update = path.update_goal(Vec2::new(2.0, 5.0), 1.0, Vec2::new(100.0, 100.0), &mesh, &planner).unwrap();
        assert_eq!(update, PathUpdate::Unreachable);
    }

    #[test]
    fn replan_failure_leaves_path() {
        let (_, planner, mut path) = strip_path();
        let before = Arc::clone(path.route());
        assert!(path.replan(Vec2::new(2.0, 5.0), NodeId(0), NodeId(2), 20.0, &planner).is_err());
        assert!(Arc::ptr_eq(&before, path.route()));
    }

    #[test]
    fn trivial_route_heads_to_goal() {
        let (_, planner) = planner(STRIP);
        let route = planner.route(NodeId(1), NodeId(1), 2.0).unwrap();
        let mut path = PortalPath::new(Vec2::new(12.0, 5.0), Goal::fixed(Vec2::new(18.0, 5.0)), route, 1.0);
        assert!(path.is_finished());
        assert_eq!(path.node(), NodeId(1));
        let s = path.preferred_direction(Vec2::new(12.0, 5.0), 1.0, 0.9);
        assert!(close(s.direction, Vec2::X));
    }
}
