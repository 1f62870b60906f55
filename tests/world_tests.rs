use cgmath::Point3;
use voxel_chunk_mesher::engine_state::{
    config::WorldConfig,
    error::VoxelError,
    rendering::{
        backend::{BackendCall, BufferTarget, IndexType, PrimitiveType, RecordingBackend},
        meshing::{IndexMode, MeshOptions},
        vertex::Vertex,
    },
    voxels::{
        block::{block_side::BlockSide, block_type::BlockType, Block},
        chunk::{Chunk, ChunkNeighbors, CHUNK_SIZE},
        world::{ChunkPosition, World},
    },
};

const FACE_AREA: u32 = (CHUNK_SIZE * CHUNK_SIZE) as u32;

fn stone() -> Block {
    Block::new(BlockType::STONE)
}

fn triangles_of(world: &World, position: ChunkPosition) -> u32 {
    world
        .mesh_cache()
        .get(position)
        .expect("chunk should be meshed")
        .mesh
        .triangle_count
}

fn legacy_config() -> WorldConfig {
    WorldConfig {
        propagate_boundary_edits: false,
        ..WorldConfig::default()
    }
}

#[test]
fn enclosed_solid_chunk_has_no_triangles() {
    let center = Chunk::filled(BlockType::STONE);
    let wall = Chunk::filled(BlockType::STONE);
    let neighbors = ChunkNeighbors::new([Some(&wall); 6]);

    let mesh = center
        .gen_mesh(&neighbors, Point3::new(0, 0, 0), &MeshOptions::default())
        .unwrap();

    assert_eq!(mesh.triangle_count, 0);
    assert!(mesh.is_empty());
}

#[test]
fn enclosed_chunk_in_world_grid_has_no_triangles() {
    let mut world = World::new(WorldConfig::default());
    for x in -1..=1 {
        for y in -1..=1 {
            for z in -1..=1 {
                world.add_chunk(Chunk::filled(BlockType::STONE), Point3::new(x, y, z));
            }
        }
    }
    world.update(&mut RecordingBackend::new());

    assert_eq!(triangles_of(&world, Point3::new(0, 0, 0)), 0);
    // A corner chunk has three open faces.
    assert_eq!(triangles_of(&world, Point3::new(1, 1, 1)), 3 * FACE_AREA * 2);
}

#[test]
fn isolated_block_has_twelve_triangles_around_its_centre() {
    let mut chunk = Chunk::empty();
    chunk.set_block(stone(), 5, 6, 7).unwrap();
    let position = Point3::new(1, 0, -1);

    let mesh = chunk
        .gen_mesh(&ChunkNeighbors::default(), position, &MeshOptions::default())
        .unwrap();

    assert_eq!(mesh.triangle_count, 12);
    assert_eq!(mesh.index_count(), 36);
    let centre = [21.0, 6.0, -9.0];
    for vertex in &mesh.vertices {
        for axis in 0..3 {
            assert!((vertex.position[axis] - centre[axis]).abs() <= 0.5);
        }
    }
}

#[test]
fn boundary_face_reappears_when_neighbor_is_removed() {
    let mut world = World::new(WorldConfig::default());
    let left = Point3::new(0, 0, 0);
    let right = Point3::new(1, 0, 0);
    world.add_chunk(Chunk::filled(BlockType::STONE), left);
    world.add_chunk(Chunk::filled(BlockType::STONE), right);
    let mut backend = RecordingBackend::new();
    world.update(&mut backend);

    assert_eq!(triangles_of(&world, left), 5 * FACE_AREA * 2);

    assert!(world.remove_chunk(right).is_some());
    let report = world.update(&mut backend);

    assert_eq!(report.meshed, vec![left]);
    assert_eq!(triangles_of(&world, left), 6 * FACE_AREA * 2);
}

#[test]
fn boundary_occluder_is_read_from_the_neighbor() {
    let solid = Chunk::filled(BlockType::STONE);
    let mut single = Chunk::empty();
    single.set_block(stone(), 15, 0, 0).unwrap();

    let covered = single
        .gen_mesh(
            &ChunkNeighbors::default().with(BlockSide::RIGHT, &solid),
            Point3::new(0, 0, 0),
            &MeshOptions::default(),
        )
        .unwrap();
    let open = single
        .gen_mesh(&ChunkNeighbors::default(), Point3::new(0, 0, 0), &MeshOptions::default())
        .unwrap();

    assert_eq!(covered.triangle_count, 10);
    assert_eq!(open.triangle_count, 12);
}

#[test]
fn second_update_without_edits_does_nothing() {
    let mut world = World::new(WorldConfig::default());
    world.add_chunk(Chunk::checkerboard(BlockType::DIRT), Point3::new(0, 0, 0));
    world.add_chunk(Chunk::filled(BlockType::STONE), Point3::new(0, 1, 0));
    let mut backend = RecordingBackend::new();

    let first = world.update(&mut backend);
    assert_eq!(first.meshed.len(), 2);
    assert_eq!(first.uploaded.len(), 2);
    let uploads = backend.upload_count();

    let second = world.update(&mut backend);
    assert!(second.meshed.is_empty());
    assert!(second.uploaded.is_empty());
    assert!(second.evicted.is_empty());
    assert_eq!(backend.upload_count(), uploads);
    assert!(world.mesh_cache().iter().all(|entry| entry.buffered && !entry.dirty));
    assert!(world.mesh_up_to_date());
}

#[test]
fn interior_edit_rebuilds_only_its_chunk() {
    let mut world = World::new(WorldConfig::default());
    world.add_chunk(Chunk::filled(BlockType::STONE), Point3::new(0, 0, 0));
    world.add_chunk(Chunk::filled(BlockType::STONE), Point3::new(1, 0, 0));
    let mut backend = RecordingBackend::new();
    world.update(&mut backend);

    assert_eq!(world.set_block(Block::AIR, 5, 5, 5), Ok(stone()));
    assert!(!world.mesh_up_to_date());
    let report = world.update(&mut backend);

    assert_eq!(report.meshed, vec![Point3::new(0, 0, 0)]);
    assert_eq!(report.uploaded, vec![Point3::new(0, 0, 0)]);
}

#[test]
fn boundary_edit_without_propagation_leaves_neighbor_stale() {
    let mut world = World::new(legacy_config());
    let left = Point3::new(0, 0, 0);
    let right = Point3::new(1, 0, 0);
    world.add_chunk(Chunk::filled(BlockType::STONE), left);
    world.add_chunk(Chunk::filled(BlockType::STONE), right);
    let mut backend = RecordingBackend::new();
    world.update(&mut backend);
    let right_before = triangles_of(&world, right);

    world.set_block(Block::AIR, 15, 0, 0).unwrap();
    let report = world.update(&mut backend);

    assert_eq!(report.meshed, vec![left]);
    // The -X face of right's cell (0, 0, 0) is now exposed but not rebuilt.
    assert_eq!(triangles_of(&world, right), right_before);
}

#[test]
fn boundary_edit_with_propagation_rebuilds_the_neighbor() {
    let mut world = World::new(WorldConfig::default());
    let left = Point3::new(0, 0, 0);
    let right = Point3::new(1, 0, 0);
    world.add_chunk(Chunk::filled(BlockType::STONE), left);
    world.add_chunk(Chunk::filled(BlockType::STONE), right);
    let mut backend = RecordingBackend::new();
    world.update(&mut backend);
    let right_before = triangles_of(&world, right);

    world.set_block(Block::AIR, 15, 0, 0).unwrap();
    let report = world.update(&mut backend);

    assert_eq!(report.meshed, vec![left, right]);
    assert_eq!(triangles_of(&world, right), right_before + 2);
}

#[test]
fn every_meshed_chunk_owns_one_buffer_pair() {
    let mut world = World::new(WorldConfig::default());
    let mut single = Chunk::empty();
    single.set_block(stone(), 0, 0, 0).unwrap();
    let chunks = [
        (Point3::new(0, 0, 0), Chunk::filled(BlockType::STONE)),
        (Point3::new(2, 0, 0), Chunk::checkerboard(BlockType::GRASS)),
        (Point3::new(0, 0, 3), Chunk::empty()),
        (Point3::new(-4, 1, 0), single),
    ];
    let positions: Vec<ChunkPosition> = chunks.iter().map(|(position, _)| *position).collect();
    for (position, chunk) in chunks {
        world.add_chunk(chunk, position);
    }
    let mut backend = RecordingBackend::new();
    world.update(&mut backend);

    assert_eq!(world.buffers().len(), positions.len());
    assert_eq!(backend.live_buffer_count(), 2 * positions.len());
    for position in positions {
        let expected = triangles_of(&world, position);
        for target in [BufferTarget::ArrayBuffer, BufferTarget::ElementArrayBuffer] {
            let record = world.buffers().record(target, position).unwrap();
            assert_eq!(record.element_count, expected);
            assert!(backend.is_live(record.handle));
        }
    }
}

#[test]
fn uploaded_bytes_match_the_mesh() {
    let mut world = World::new(WorldConfig::default());
    let position = Point3::new(0, 0, 0);
    world.add_chunk(Chunk::checkerboard(BlockType::WOOD), position);
    let mut backend = RecordingBackend::new();
    world.update(&mut backend);

    let mesh = &world.mesh_cache().get(position).unwrap().mesh;
    let (vertex, index) = world.buffers().handles(position).unwrap();
    assert_eq!(backend.buffer_contents(vertex), Some(mesh.vertex_bytes()));
    assert_eq!(backend.buffer_contents(index), Some(mesh.index_bytes()));
}

#[test]
fn removing_a_chunk_frees_both_buffers() {
    let mut world = World::new(WorldConfig::default());
    let kept = Point3::new(0, 0, 0);
    let removed = Point3::new(0, 0, 1);
    world.add_chunk(Chunk::filled(BlockType::STONE), kept);
    world.add_chunk(Chunk::filled(BlockType::STONE), removed);
    let mut backend = RecordingBackend::new();
    world.update(&mut backend);
    let (vertex, index) = world.buffers().handles(removed).unwrap();

    world.remove_chunk(removed);
    let report = world.update(&mut backend);

    assert_eq!(report.evicted, vec![removed]);
    assert!(!backend.is_live(vertex));
    assert!(!backend.is_live(index));
    assert!(world.buffers().handles(removed).is_none());
    assert!(world.buffers().handles(kept).is_some());
    assert_eq!(world.render(&mut backend), 1);
}

#[test]
fn eviction_is_inert_when_disabled() {
    let mut world = World::new(WorldConfig {
        evict_unused_buffers: false,
        ..WorldConfig::default()
    });
    let position = Point3::new(0, 0, 0);
    world.add_chunk(Chunk::filled(BlockType::STONE), position);
    let mut backend = RecordingBackend::new();
    world.update(&mut backend);

    world.remove_chunk(position);
    let report = world.update(&mut backend);

    assert!(report.evicted.is_empty());
    assert_eq!(backend.live_buffer_count(), 2);
    assert!(world.buffers().handles(position).is_some());
}

#[test]
fn retained_buffers_are_still_drawn_when_eviction_is_disabled() {
    let mut world = World::new(WorldConfig {
        evict_unused_buffers: false,
        ..WorldConfig::default()
    });
    let kept = Point3::new(0, 0, 0);
    let removed = Point3::new(5, 0, 0);
    let mut single = Chunk::empty();
    single.set_block(stone(), 4, 4, 4).unwrap();
    world.add_chunk(Chunk::filled(BlockType::STONE), kept);
    world.add_chunk(single, removed);
    let mut backend = RecordingBackend::new();
    world.update(&mut backend);
    let (vertex, index) = world.buffers().handles(removed).unwrap();

    world.remove_chunk(removed);
    world.update(&mut backend);
    backend.clear_calls();

    assert_eq!(world.buffers().len(), 2);
    assert_eq!(world.render(&mut backend), 2);
    assert!(backend.draw_calls().contains(&&BackendCall::DrawIndexed {
        vertex_buffer: vertex,
        index_buffer: index,
        primitive: PrimitiveType::Triangles,
        count: 36,
        index_type: IndexType::UnsignedInt,
        offset: 0,
    }));
}

#[test]
fn draw_count_is_three_indices_per_recorded_triangle() {
    let mut world = World::new(WorldConfig::default());
    let position = Point3::new(0, 0, 0);
    world.add_chunk(Chunk::checkerboard(BlockType::WHITE), position);
    let mut backend = RecordingBackend::new();
    world.update(&mut backend);
    backend.clear_calls();

    world.render(&mut backend);

    let record = world.buffers().record(BufferTarget::ElementArrayBuffer, position).unwrap();
    assert_eq!(record.element_count, triangles_of(&world, position));
    let draws = backend.draw_calls();
    assert_eq!(draws.len(), 1);
    match draws[0] {
        BackendCall::DrawIndexed { count, .. } => assert_eq!(*count, 3 * record.element_count),
        other => panic!("unexpected call {:?}", other),
    }
}

#[test]
fn render_issues_the_fixed_per_chunk_sequence() {
    let mut world = World::new(WorldConfig::default());
    let position = Point3::new(0, 0, 0);
    let mut chunk = Chunk::empty();
    chunk.set_block(stone(), 3, 3, 3).unwrap();
    world.add_chunk(chunk, position);
    let mut backend = RecordingBackend::new();
    world.update(&mut backend);
    let (vertex, index) = world.buffers().handles(position).unwrap();
    backend.clear_calls();

    assert_eq!(world.render(&mut backend), 1);

    let mut expected = vec![BackendCall::BindBuffer(BufferTarget::ArrayBuffer, vertex)];
    expected.extend(Vertex::ATTRIBUTES.map(BackendCall::SetVertexAttribute));
    expected.push(BackendCall::BindBuffer(BufferTarget::ElementArrayBuffer, index));
    expected.push(BackendCall::DrawIndexed {
        vertex_buffer: vertex,
        index_buffer: index,
        primitive: PrimitiveType::Triangles,
        count: 36,
        index_type: IndexType::UnsignedInt,
        offset: 0,
    });
    assert_eq!(backend.calls(), expected.as_slice());
}

#[test]
fn render_updates_a_stale_world_first() {
    let mut world = World::new(WorldConfig::default());
    world.add_chunk(Chunk::filled(BlockType::STONE), Point3::new(0, 0, 0));
    let mut backend = RecordingBackend::new();

    assert_eq!(world.render(&mut backend), 1);
    assert_eq!(backend.upload_count(), 2);

    world.set_block(Block::AIR, 0, 0, 0).unwrap();
    assert_eq!(world.render(&mut backend), 1);
    assert_eq!(backend.upload_count(), 4);
    assert_eq!(backend.live_buffer_count(), 2);
}

#[test]
fn deduplicated_indexing_keeps_triangles_and_shrinks_vertices() {
    let shared = World::new(WorldConfig {
        index_mode: IndexMode::Deduplicated,
        ..WorldConfig::default()
    });
    let unshared = World::new(WorldConfig::default());
    let position = Point3::new(0, 0, 0);

    let mut meshes = Vec::new();
    for mut world in [shared, unshared] {
        world.add_chunk(Chunk::filled(BlockType::STONE), position);
        world.update(&mut RecordingBackend::new());
        meshes.push(world.mesh_cache().get(position).unwrap().mesh.clone());
    }

    assert_eq!(meshes[0].triangle_count, meshes[1].triangle_count);
    assert!(meshes[0].vertex_count() < meshes[1].vertex_count());
    assert_eq!(meshes[1].vertex_count(), meshes[1].index_count() as usize);
}

#[test]
fn negative_coordinates_resolve_to_negative_chunks() {
    let mut world = World::new(WorldConfig::default());
    world.add_chunk(Chunk::empty(), Point3::new(-1, -1, -1));

    world.set_block(stone(), -1, -1, -1).unwrap();

    let chunk = world.get_chunk(Point3::new(-1, -1, -1)).unwrap();
    assert_eq!(chunk.get_block(15, 15, 15), Some(&stone()));
    assert_eq!(world.get_block(-1, -1, -1), Some(&stone()));
}

#[test]
fn edits_outside_loaded_chunks_are_rejected() {
    let mut world = World::new(WorldConfig::default());
    world.add_chunk(Chunk::empty(), Point3::new(0, 0, 0));

    assert_eq!(
        world.set_block(stone(), 16, 0, 0),
        Err(VoxelError::ChunkNotLoaded(Point3::new(1, 0, 0)))
    );
    assert_eq!(world.get_block(16, 0, 0), None);
}

#[test]
fn culling_switch_off_emits_every_face() {
    let mut world = World::new(WorldConfig {
        face_culling: false,
        ..WorldConfig::default()
    });
    let mut chunk = Chunk::empty();
    chunk.set_block(stone(), 0, 0, 0).unwrap();
    chunk.set_block(stone(), 1, 0, 0).unwrap();
    world.add_chunk(chunk, Point3::new(0, 0, 0));
    world.update(&mut RecordingBackend::new());

    assert_eq!(triangles_of(&world, Point3::new(0, 0, 0)), 24);
}
