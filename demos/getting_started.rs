use geoquad::{BBox, QuadTreeBuilder, SpatialIndex};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging (set RUST_LOG=trace to see node splits)
    env_logger::init();

    println!("=== geoquad - Getting Started ===\n");

    // A small leaf capacity makes the tree split early
    let mut tree = QuadTreeBuilder::new().entries_per_leaf(2).build()?;
    println!("✓ Created empty quad-tree\n");

    // === INSERTION ===
    println!("1. Inserting Points");
    println!("-------------------");

    tree.add(40.7128, -74.0060, "New York")?;
    tree.add(51.5074, -0.1278, "London")?;
    tree.add(48.8566, 2.3522, "Paris")?;
    tree.add(50.8503, 4.3517, "Brussels")?;
    tree.add(52.3676, 4.9041, "Amsterdam")?;
    println!("   Stored {} cities in {} nodes\n", tree.size(), tree.count());

    // === RADIUS QUERIES ===
    println!("2. Radius Queries");
    println!("-----------------");

    // Radius is in meters
    let nearby = tree.get_nodes(51.5074, -0.1278, 500_000.0)?;
    println!("   Found {} cities within 500km of London:", nearby.len());
    for entry in &nearby {
        println!("     - {} at {:.4},{:.4}", entry.value(), entry.lat(), entry.lon());
    }
    println!();

    // === SHAPE QUERIES ===
    println!("3. Bounding Box Queries");
    println!("-----------------------");

    let benelux = BBox::new(2.5, 49.5, 7.2, 53.6);
    for entry in tree.get_nodes_in(&benelux) {
        println!("   - {} is in {}", entry.value(), benelux);
    }
    println!();

    // === EXACT LOOKUP AND REMOVAL ===
    println!("4. Exact Lookup and Removal");
    println!("---------------------------");

    tree.add(48.8566, 2.3522, "Paris (again)")?;
    let at_paris = tree.get_nodes_from_value(48.8566, 2.3522, None);
    println!("   {} entries stored at Paris", at_paris.len());

    let removed = tree.remove(48.8566, 2.3522);
    println!("   Removed {} entries, {} left\n", removed, tree.size());

    // === INTROSPECTION ===
    println!("5. Introspection");
    println!("----------------");

    let stats = SpatialIndex::stats(&tree);
    println!("   {:?}", stats);
    println!(
        "   Unused slots: {} in branches, {} overall",
        tree.empty_entries(true),
        tree.empty_entries(false)
    );
    println!("   Tree levels:\n{}", tree.to_detail_string());

    tree.clear();
    println!("✓ Cleared, empty: {}", tree.is_empty());

    Ok(())
}
