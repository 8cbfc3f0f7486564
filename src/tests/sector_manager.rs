use super::LineSectorManager;
use crate::move_tree::{MoveTree, NodeId};
use crate::sector::{SectorEntry, SectorId, SectorType};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

/// Builds a tree from `(parent, san)` pairs where `parent` indexes previously added moves
/// (0 is the root) and labels it.
fn tree_from(moves: &[(usize, &str)]) -> (MoveTree, Vec<NodeId>) {
    let mut tree = MoveTree::new();
    let mut ids = vec![tree.root()];
    for &(parent, san) in moves {
        let id = tree.add_child(ids[parent], san);
        ids.push(id);
    }
    tree.assign_line_ids();
    (tree, ids)
}

fn live_ids(manager: &LineSectorManager) -> Vec<usize> {
    manager.line_sectors().map(|s| s.id.0).collect()
}

fn sans(tree: &MoveTree, manager: &LineSectorManager, id: usize) -> Vec<String> {
    manager
        .sector(SectorId(id))
        .entries
        .iter()
        .map(|entry| match *entry {
            SectorEntry::Move(node) => tree.node(node).san.clone(),
            SectorEntry::OpenBracket => "(".to_string(),
            SectorEntry::CloseBracket => ")".to_string(),
        })
        .collect()
}

/// 1.e4 e5 2.Nf3 (2.Nc3 Nf6) 2...Nc6 3.Bb5 (3.Bc4 Bc5) 3...a6 4.Ba4
fn ruy_lopez() -> MoveTree {
    tree_from(&[
        (0, "e4"),  // 1
        (1, "e5"),  // 2
        (2, "Nf3"), // 3
        (2, "Nc3"), // 4
        (4, "Nf6"), // 5
        (3, "Nc6"), // 6
        (6, "Bb5"), // 7
        (6, "Bc4"), // 8
        (8, "Bc5"), // 9
        (7, "a6"),  // 10
        (10, "Ba4"), // 11
    ])
    .0
}

#[test]
fn test_single_chain_is_one_leaf_sector() {
    let (tree, ids) = tree_from(&[(0, "e4"), (1, "e5"), (2, "Nf3")]);
    let mut manager = LineSectorManager::new(2);
    manager.build_line_sectors(&tree).unwrap();

    assert_eq!(manager.len(), 2);
    let root = manager.sector(SectorId(0));
    assert_eq!(root.branch_level, 0);
    assert_eq!(root.display_level, -1);
    assert_eq!(root.sector_type, SectorType::Root);
    assert_eq!(root.entries, vec![SectorEntry::Move(ids[0])]);

    let stem = manager.sector(SectorId(1));
    assert_eq!(stem.sector_type, SectorType::Leaf);
    assert_eq!(stem.display_level, 0);
    assert_eq!(stem.branch_level, 1);
    assert_eq!(stem.nodes().collect::<Vec<_>>(), ids[1..].to_vec());

    assert!(manager.has_index_level_zero());
    assert_eq!(manager.first_index_branch_level(), 1);
    assert_eq!(manager.max_branch_level(), 1);
}

#[test]
fn test_root_fork_has_no_stem() {
    let (tree, _) = tree_from(&[(0, "e4"), (0, "d4"), (1, "e5")]);
    let mut manager = LineSectorManager::new(2);
    manager.build_line_sectors(&tree).unwrap();

    assert_eq!(manager.first_index_branch_level(), 2);
    assert!(!manager.has_index_level_zero());
    assert_eq!(manager.max_branch_level(), 2);
    assert_eq!(live_ids(&manager), vec![0, 1, 2]);
    assert_eq!(sans(&tree, &manager, 1), vec!["e4", "e5"]);
    assert_eq!(sans(&tree, &manager, 2), vec!["d4"]);
    assert_eq!(manager.sector(SectorId(1)).display_level, 0);
    assert_eq!(manager.sector(SectorId(2)).display_level, 0);
}

#[test]
fn test_root_only_tree() {
    let tree = MoveTree::from_json("{}").unwrap();
    let mut manager = LineSectorManager::new(2);
    manager.build_line_sectors(&tree).unwrap();

    assert_eq!(manager.len(), 1);
    assert_eq!(manager.max_branch_level(), 0);
    assert!(!manager.has_index_level_zero());
}

#[test]
fn test_index_predicates() {
    let manager = LineSectorManager::new(1);

    assert!(manager.is_index_level(0));
    assert!(manager.is_index_level(2));
    assert!(!manager.is_index_level(3));
    assert!(manager.is_last_index_line(2));
    assert!(!manager.is_last_index_line(1));
    assert!(!manager.is_last_index_line(3));
}

#[test]
fn test_index_layout_increments_display_level() {
    // 1.e4 (1.e4 e5 / 1.e4 c5) and 1.d4, all inside the index.
    let (tree, _) = tree_from(&[(0, "e4"), (0, "d4"), (1, "e5"), (1, "c5")]);
    let mut manager = LineSectorManager::new(2);
    manager.build_line_sectors(&tree).unwrap();

    assert_eq!(live_ids(&manager), vec![0, 1, 2, 3, 4]);
    let levels: Vec<(u32, i32)> = manager
        .line_sectors()
        .map(|s| (s.branch_level, s.display_level))
        .collect();
    assert_eq!(levels, vec![(0, -1), (2, 0), (3, 1), (3, 1), (2, 0)]);
    assert_eq!(sans(&tree, &manager, 1), vec!["e4"]);
    assert_eq!(
        manager.sector(SectorId(1)).children,
        vec![SectorId(2), SectorId(3)]
    );
    assert_eq!(manager.sector(SectorId(1)).sector_type, SectorType::Forking);
}

#[test]
fn test_game_layout_splices_main_line() {
    // Past the index the side line is built first and the main move joins the parent.
    let (tree, _) = tree_from(&[
        (0, "e4"),
        (1, "e5"),
        (2, "Nf3"),
        (2, "Nc3"),
        (4, "Nf6"),
        (3, "Nc6"),
    ]);
    let mut manager = LineSectorManager::new(0);
    manager.build_line_sectors(&tree).unwrap();

    assert_eq!(live_ids(&manager), vec![0, 1, 2, 3]);
    assert_eq!(sans(&tree, &manager, 1), vec!["e4", "e5", "Nf3"]);
    assert_eq!(sans(&tree, &manager, 2), vec!["Nc3", "Nf6"]);
    assert_eq!(sans(&tree, &manager, 3), vec!["Nc6"]);

    let stem = manager.sector(SectorId(1));
    assert_eq!(stem.children, vec![SectorId(2), SectorId(3)]);
    assert_eq!(manager.sector(SectorId(2)).display_level, 1);
    assert_eq!(manager.sector(SectorId(3)).display_level, 0);
}

#[test]
fn test_main_line_leaf_leaves_empty_sector() {
    let (tree, _) = tree_from(&[(0, "e4"), (1, "e5"), (1, "c5"), (3, "Nf3")]);
    let mut manager = LineSectorManager::new(0);
    manager.build_line_sectors(&tree).unwrap();

    assert_eq!(sans(&tree, &manager, 1), vec!["e4", "e5"]);
    assert_eq!(sans(&tree, &manager, 2), vec!["c5", "Nf3"]);
    let emptied = manager.sector(SectorId(3));
    assert!(emptied.entries.is_empty());
    assert_eq!(emptied.sector_type, SectorType::Leaf);
}

#[test]
fn test_sibling_leaf_is_bracketed_into_main_line() {
    let tree = ruy_lopez();
    let mut manager = LineSectorManager::new(0);
    manager.build_line_sectors(&tree).unwrap();

    // Sector 4 (3.Bc4 Bc5) is bracketed into sector 5, which sector 3 then absorbs.
    assert_eq!(live_ids(&manager), vec![0, 1, 2, 3]);
    assert_eq!(
        sans(&tree, &manager, 3),
        vec!["Nc6", "Bb5", "(", "Bc4", "Bc5", ")", "a6", "Ba4"]
    );
    let merged = manager.sector(SectorId(3));
    assert_eq!(merged.sector_type, SectorType::Leaf);
    assert!(merged.children.is_empty());
}

#[test]
fn test_index_levels_are_not_bracketed() {
    let tree = ruy_lopez();
    let mut manager = LineSectorManager::new(1);
    manager.build_line_sectors(&tree).unwrap();

    // Level 2 is index now, so 2.Nf3 opens its own group and 3.Bc4 is never bracketed.
    assert_eq!(live_ids(&manager), vec![0, 1, 2, 3, 4, 5]);
    assert_eq!(sans(&tree, &manager, 2), vec!["Nf3", "Nc6", "Bb5"]);
    assert_eq!(sans(&tree, &manager, 3), vec!["Bc4", "Bc5"]);
    assert_eq!(sans(&tree, &manager, 4), vec!["a6", "Ba4"]);
    assert_eq!(sans(&tree, &manager, 5), vec!["Nc3", "Nf6"]);
    assert_eq!(manager.sector(SectorId(2)).display_level, 1);
    assert_eq!(manager.sector(SectorId(3)).display_level, 2);
    assert_eq!(manager.sector(SectorId(4)).display_level, 1);
}

#[test]
fn test_top_lines_collapse_chain() {
    // Two consecutive forks each with a leaf side line collapse into one sector.
    let (tree, _) = tree_from(&[
        (0, "e4"),   // 1
        (1, "e5"),   // 2
        (2, "Nf3"),  // 3
        (2, "Nc3"),  // 4
        (4, "Nf6"),  // 5
        (3, "Nc6"),  // 6
        (6, "Bb5"),  // 7
        (6, "Bc4"),  // 8
        (8, "Bc5"),  // 9
        (7, "a6"),   // 10
        (10, "Ba4"), // 11
        (11, "Nf6"), // 12
        (11, "d6"),  // 13
        (12, "O-O"), // 14
    ]);
    let mut manager = LineSectorManager::new(0);
    manager.build_line_sectors(&tree).unwrap();

    assert_eq!(live_ids(&manager), vec![0, 1, 2, 3]);
    assert_eq!(
        sans(&tree, &manager, 3),
        vec![
            "Nc6", "Bb5", "(", "Bc4", "Bc5", ")", "a6", "Ba4", "Nf6", "(", "d6", ")", "O-O"
        ]
    );
    for gone in [4, 5, 6, 7] {
        assert!(!live_ids(&manager).contains(&gone), "sector {gone} should be merged");
    }
}

#[test]
fn test_rebuild_discards_previous_state() {
    let mut manager = LineSectorManager::new(0);
    manager.build_line_sectors(&ruy_lopez()).unwrap();

    let (small, _) = tree_from(&[(0, "d4")]);
    manager.build_line_sectors(&small).unwrap();

    assert_eq!(live_ids(&manager), vec![0, 1]);
    assert_eq!(manager.max_branch_level(), 1);
    assert_eq!(manager.line_id_assignments().len(), 2);
}

#[test]
fn test_invalid_tree_keeps_previous_build() {
    let mut manager = LineSectorManager::new(0);
    let tree = ruy_lopez();
    manager.build_line_sectors(&tree).unwrap();

    let mut unlabelled = MoveTree::new();
    let root = unlabelled.root();
    unlabelled.add_child(root, "e4");
    assert!(manager.build_line_sectors(&unlabelled).is_err());

    assert_eq!(live_ids(&manager), vec![0, 1, 2, 3]);
}

#[test]
fn test_line_id_assignments_relabel_tree() {
    let tree = ruy_lopez();
    let mut manager = LineSectorManager::new(0);
    manager.build_line_sectors(&tree).unwrap();

    let assignments = manager.line_id_assignments();
    assert_eq!(assignments.len(), tree.len());

    let mut relabelled = tree.clone();
    for i in 0..relabelled.len() {
        relabelled.node_mut(NodeId(i)).line_id = None;
    }
    relabelled.apply_line_ids(assignments);
    relabelled.validate().unwrap();
    for i in 0..tree.len() {
        let id = NodeId(i);
        assert_eq!(relabelled.node(id).line_id, tree.node(id).line_id);
    }
}

fn random_tree(parents: &[prop::sample::Index]) -> MoveTree {
    let mut tree = MoveTree::new();
    let mut ids = vec![tree.root()];
    for (i, parent) in parents.iter().enumerate() {
        let at = ids[parent.index(ids.len())];
        ids.push(tree.add_child(at, &format!("m{i}")));
    }
    tree.assign_line_ids();
    tree
}

proptest! {
    #[test]
    fn prop_every_node_appears_once(
        parents in prop::collection::vec(any::<prop::sample::Index>(), 0..48),
        depth in 0u32..4,
    ) {
        let tree = random_tree(&parents);
        let mut manager = LineSectorManager::new(depth);
        manager.build_line_sectors(&tree).unwrap();

        let mut seen = vec![0usize; tree.len()];
        for sector in manager.line_sectors() {
            for node in sector.nodes() {
                seen[node.0] += 1;
            }
        }
        prop_assert!(seen.iter().all(|&count| count == 1), "counts: {:?}", seen);
    }

    #[test]
    fn prop_root_sector_is_untouched(
        parents in prop::collection::vec(any::<prop::sample::Index>(), 0..48),
        depth in 0u32..4,
    ) {
        let tree = random_tree(&parents);
        let mut manager = LineSectorManager::new(depth);
        manager.build_line_sectors(&tree).unwrap();

        let roots: Vec<_> = manager
            .line_sectors()
            .filter(|s| s.branch_level == 0)
            .collect();
        prop_assert_eq!(roots.len(), 1);
        prop_assert_eq!(&roots[0].entries, &vec![SectorEntry::Move(tree.root())]);
        prop_assert_eq!(roots[0].display_level, -1);
    }

    #[test]
    fn prop_max_branch_level_matches_tree(
        parents in prop::collection::vec(any::<prop::sample::Index>(), 0..48),
    ) {
        let tree = random_tree(&parents);
        let mut manager = LineSectorManager::new(2);
        manager.build_line_sectors(&tree).unwrap();

        let deepest = (1..tree.len())
            .map(|i| tree.branch_level_of(NodeId(i)).unwrap())
            .max()
            .unwrap_or(0);
        prop_assert_eq!(manager.max_branch_level(), deepest);
    }

    #[test]
    fn prop_index_level_zero_iff_stem(
        parents in prop::collection::vec(any::<prop::sample::Index>(), 0..24),
    ) {
        let tree = random_tree(&parents);
        let mut manager = LineSectorManager::new(1);
        manager.build_line_sectors(&tree).unwrap();

        let stem = tree
            .children(tree.root())
            .first()
            .is_some_and(|&first| tree.branch_level_of(first).unwrap() == 1);
        prop_assert_eq!(manager.has_index_level_zero(), stem);
    }

    #[test]
    fn prop_live_sectors_link_to_live_parents(
        parents in prop::collection::vec(any::<prop::sample::Index>(), 0..48),
        depth in 0u32..4,
    ) {
        let tree = random_tree(&parents);
        let mut manager = LineSectorManager::new(depth);
        manager.build_line_sectors(&tree).unwrap();

        let live: Vec<SectorId> = manager.line_sectors().map(|s| s.id).collect();
        for sector in manager.line_sectors() {
            if let Some(parent) = sector.parent {
                prop_assert!(live.contains(&parent));
                prop_assert!(manager.sector(parent).children.contains(&sector.id));
            }
        }
    }

    #[test]
    fn prop_index_level_is_monotonic(depth in 0u32..8, level in 0u32..16) {
        let manager = LineSectorManager::new(depth);
        if !manager.is_index_level(level) {
            prop_assert!(!manager.is_index_level(level + 1));
        }
    }
}
