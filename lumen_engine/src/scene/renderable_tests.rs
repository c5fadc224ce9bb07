use super::*;
use crate::device::mock_graphics_device::MockGraphicsDevice;
use crate::device::{Extent2D, FramebufferHandle, RenderPassHandle};
use crate::error::Error;
use crate::memory::BufferAllocator;
use crate::pipeline::InMemoryShaderLoader;
use crate::scene::{MeshData, MeshPolygon, MeshVertex, DYNAMIC_MESH_MEMORY};

// ============================================================================
// HELPERS
// ============================================================================

const RENDER_PASS: RenderPassHandle = RenderPassHandle::from_raw(9000);

fn framebuffers(count: u64) -> Vec<FramebufferHandle> {
    (0..count).map(|i| FramebufferHandle::from_raw(9100 + i)).collect()
}

struct Fixture {
    mock: Arc<MockGraphicsDevice>,
    device: Arc<dyn GraphicsDevice>,
    loader: InMemoryShaderLoader,
    targets: Arc<SurfaceTargets>,
    pipeline: Arc<PipelineState>,
}

impl Fixture {
    fn new(slots: u64) -> Self {
        let mock = Arc::new(MockGraphicsDevice::new());
        let device: Arc<dyn GraphicsDevice> = mock.clone();
        let loader = InMemoryShaderLoader::new()
            .with("default", vec![1; 8], vec![2; 8])
            .with("wireframe", vec![3; 8], vec![4; 8]);

        let targets = Arc::new(SurfaceTargets::new(1));
        targets.publish(RENDER_PASS, framebuffers(slots), Extent2D::new(800, 600));

        let pipeline = PipelineState::create(
            Arc::clone(&device), &loader, "default", RENDER_PASS, Extent2D::new(800, 600),
        ).unwrap();

        Self { mock, device, loader, targets, pipeline }
    }

    fn pipeline(&self, name: &str) -> Arc<PipelineState> {
        PipelineState::create(
            Arc::clone(&self.device), &self.loader, name, RENDER_PASS, Extent2D::new(800, 600),
        ).unwrap()
    }

    fn mesh_object(&self) -> RenderableObject {
        let allocator = BufferAllocator::new(Arc::clone(&self.device));
        let mesh = DynamicMesh::new(&allocator, &MeshData::triangle()).unwrap();
        RenderableObject::new(Arc::clone(&self.device), RenderableKind::DynamicMesh(mesh)).unwrap()
    }

    fn bound_object(&self) -> RenderableObject {
        let mut object = self.mesh_object();
        object.set_surface(Arc::clone(&self.targets));
        object.set_pipeline(Arc::clone(&self.pipeline));
        object
    }
}

// ============================================================================
// DYNAMIC MESH
// ============================================================================

#[test]
fn test_dynamic_mesh_uploads_into_host_coherent_buffers() {
    let fx = Fixture::new(2);
    let object = fx.mesh_object();
    let mesh = object.as_dynamic_mesh().unwrap();

    assert_eq!(mesh.polygon_count(), 1);
    assert_eq!(mesh.index_count(), 3);
    for buffer in [mesh.vertex_buffer(), mesh.index_buffer()] {
        assert_eq!(buffer.required_flags(), DYNAMIC_MESH_MEMORY);
        assert_eq!(fx.mock.buffer_binding(buffer.buffer()), Some(buffer.memory()));
    }

    let vertex_bytes = fx.mock.memory_contents(mesh.vertex_buffer().memory());
    assert_eq!(&vertex_bytes[..36], bytemuck::cast_slice::<MeshVertex, u8>(mesh.vertices()));
    let index_bytes = fx.mock.memory_contents(mesh.index_buffer().memory());
    assert_eq!(&index_bytes[..12], bytemuck::cast_slice::<u32, u8>(&[0, 1, 2]));
}

#[test]
fn test_dynamic_mesh_rejects_invalid_mesh_without_allocating() {
    let fx = Fixture::new(2);
    let baseline = fx.mock.live_objects();
    let allocator = BufferAllocator::new(Arc::clone(&fx.device));

    let result = DynamicMesh::new(&allocator, &MeshData::default());
    assert!(matches!(result, Err(Error::ConfigurationError(_))));
    assert_eq!(fx.mock.live_objects(), baseline);
}

#[test]
fn test_dynamic_mesh_upload_failure_releases_buffers() {
    let fx = Fixture::new(2);
    let baseline = fx.mock.live_objects();
    let allocator = BufferAllocator::new(Arc::clone(&fx.device));

    fx.mock.fail_on("write_memory");
    let result = DynamicMesh::new(&allocator, &MeshData::triangle());
    assert!(matches!(result, Err(Error::DeviceError(_))));
    assert_eq!(fx.mock.live_objects(), baseline);
}

#[test]
fn test_update_copies_edited_vertices() {
    let fx = Fixture::new(2);
    let mut object = fx.mesh_object();

    let moved = MeshVertex::new(0.25, -0.5, 0.5);
    object.as_dynamic_mesh_mut().unwrap().set_vertex(1, moved).unwrap();
    object.update().unwrap();

    let mesh = object.as_dynamic_mesh().unwrap();
    let bytes = fx.mock.memory_contents(mesh.vertex_buffer().memory());
    assert_eq!(&bytes[12..24], bytemuck::bytes_of(&moved));
    assert_eq!(&bytes[..12], bytemuck::bytes_of(&MeshData::triangle().vertices[0]));
}

#[test]
fn test_set_vertex_out_of_range() {
    let fx = Fixture::new(2);
    let mut object = fx.mesh_object();
    let mesh = object.as_dynamic_mesh_mut().unwrap();
    assert!(matches!(mesh.set_vertex(3, MeshVertex::default()), Err(Error::InvalidResource(_))));
}

#[test]
fn test_update_uploads_edited_polygons() {
    let fx = Fixture::new(2);
    let mut object = fx.mesh_object();

    let flipped = MeshPolygon::new(2, 1, 0);
    object.as_dynamic_mesh_mut().unwrap().polygons_mut()[0] = flipped;
    object.update().unwrap();

    let mesh = object.as_dynamic_mesh().unwrap();
    let bytes = fx.mock.memory_contents(mesh.index_buffer().memory());
    assert_eq!(&bytes[..12], bytemuck::bytes_of(&flipped));
}

#[test]
fn test_update_rejects_polygon_outside_vertices() {
    let fx = Fixture::new(2);
    let mut object = fx.mesh_object();
    let index_memory = object.as_dynamic_mesh().unwrap().index_buffer().memory();
    let before = fx.mock.memory_contents(index_memory);

    object.as_dynamic_mesh_mut().unwrap().polygons_mut()[0] = MeshPolygon::new(0, 1, 7);
    assert!(matches!(object.update(), Err(Error::InvalidResource(_))));
    assert_eq!(fx.mock.memory_contents(index_memory), before);
}

#[test]
fn test_set_polygon_checks_ranges() {
    let fx = Fixture::new(2);
    let mut object = fx.mesh_object();
    let mesh = object.as_dynamic_mesh_mut().unwrap();

    assert!(matches!(mesh.set_polygon(1, MeshPolygon::new(0, 1, 2)), Err(Error::InvalidResource(_))));
    assert!(matches!(mesh.set_polygon(0, MeshPolygon::new(0, 1, 3)), Err(Error::InvalidResource(_))));
    mesh.set_polygon(0, MeshPolygon::new(1, 2, 0)).unwrap();
    assert_eq!(mesh.polygons()[0], MeshPolygon::new(1, 2, 0));
}

// ============================================================================
// COMMAND LIST CACHE
// ============================================================================

#[test]
fn test_new_object_is_dirty_and_unbound() {
    let fx = Fixture::new(2);
    let mut object = fx.mesh_object();

    assert!(object.is_dirty());
    assert!(!object.is_bound());
    assert!(matches!(object.get_active_command_list(false), Err(Error::InvalidResource(_))));

    object.set_surface(Arc::clone(&fx.targets));
    assert!(!object.is_bound());
    assert!(matches!(object.rebuild_command_lists(), Err(Error::InvalidResource(_))));
    assert_eq!(object.rebuild_count(), 0);
}

#[test]
fn test_first_call_records_one_list_per_slot() {
    let fx = Fixture::new(2);
    let mut object = fx.bound_object();

    let active = object.get_active_command_list(false).unwrap();
    let lists = object.command_lists().to_vec();
    assert_eq!(lists.len(), 2);
    assert_eq!(active, lists[0]);
    assert!(!object.is_dirty());

    let mesh = object.as_dynamic_mesh().unwrap();
    let pipeline = fx.pipeline.handle().unwrap().as_raw();
    for (slot, list) in lists.iter().enumerate() {
        let recorded = fx.mock.command_list(*list).unwrap();
        assert_eq!(recorded.level, crate::device::CommandListLevel::Secondary);
        assert_eq!(recorded.inheritance.unwrap().subpass, 0);
        assert_eq!(recorded.commands, vec![
            format!("begin(continue rp={} fb={})", RENDER_PASS.as_raw(), 9100 + slot),
            format!("bind_pipeline({})", pipeline),
            format!("bind_vertex_buffer(0, {}, 0)", mesh.vertex_buffer().buffer().as_raw()),
            format!("bind_index_buffer({}, 0, U32)", mesh.index_buffer().buffer().as_raw()),
            "draw_indexed(3, 1, 0, 0, 0)".to_string(),
            "end".to_string(),
        ]);
    }
}

#[test]
fn test_repeated_calls_reuse_cache() {
    let fx = Fixture::new(2);
    let mut object = fx.bound_object();

    let first = object.get_active_command_list(false).unwrap();
    let second = object.get_active_command_list(false).unwrap();

    assert_eq!(first, second);
    assert_eq!(object.rebuild_count(), 1);
    assert_eq!(fx.mock.begin_count(first), 1);
}

#[test]
fn test_active_list_follows_current_slot() {
    let fx = Fixture::new(3);
    let mut object = fx.bound_object();
    object.get_active_command_list(false).unwrap();
    let lists = object.command_lists().to_vec();

    fx.targets.set_current_slot(2);
    assert_eq!(object.get_active_command_list(false).unwrap(), lists[2]);
    fx.targets.set_current_slot(1);
    assert_eq!(object.get_active_command_list(false).unwrap(), lists[1]);
    assert_eq!(object.rebuild_count(), 1);
}

#[test]
fn test_set_pipeline_change_triggers_one_rebuild() {
    let fx = Fixture::new(2);
    let mut object = fx.bound_object();
    object.get_active_command_list(false).unwrap();

    // same pipeline: no-op
    object.set_pipeline(Arc::clone(&fx.pipeline));
    assert!(!object.is_dirty());

    let wireframe = fx.pipeline("wireframe");
    object.set_pipeline(Arc::clone(&wireframe));
    assert!(object.is_dirty());

    let active = object.get_active_command_list(false).unwrap();
    object.get_active_command_list(false).unwrap();
    assert_eq!(object.rebuild_count(), 2);
    assert!(!object.is_dirty());
    assert_eq!(
        fx.mock.commands(active)[1],
        format!("bind_pipeline({})", wireframe.handle().unwrap().as_raw())
    );
}

#[test]
fn test_set_surface_same_targets_is_noop() {
    let fx = Fixture::new(2);
    let mut object = fx.bound_object();
    object.get_active_command_list(false).unwrap();

    object.set_surface(Arc::clone(&fx.targets));
    assert!(!object.is_dirty());

    let other = Arc::new(SurfaceTargets::new(2));
    other.publish(RENDER_PASS, framebuffers(2), Extent2D::new(640, 480));
    object.set_surface(other);
    assert!(object.is_dirty());
}

#[test]
fn test_force_rebuild_rerecords() {
    let fx = Fixture::new(2);
    let mut object = fx.bound_object();
    let list = object.get_active_command_list(false).unwrap();

    assert_eq!(object.get_active_command_list(true).unwrap(), list);
    assert_eq!(object.rebuild_count(), 2);
    assert_eq!(fx.mock.begin_count(list), 2);
}

#[test]
fn test_new_generation_invalidates_cache() {
    let fx = Fixture::new(2);
    let mut object = fx.bound_object();
    object.get_active_command_list(false).unwrap();
    let old_lists = object.command_lists().to_vec();

    fx.targets.publish(RENDER_PASS, framebuffers(2), Extent2D::new(1024, 768));
    assert!(object.is_dirty());

    object.get_active_command_list(false).unwrap();
    assert_eq!(object.rebuild_count(), 2);
    // same slot count: lists are re-recorded in place
    assert_eq!(object.command_lists(), old_lists.as_slice());
}

#[test]
fn test_pipeline_rebuilt_in_place_invalidates_cache() {
    let fx = Fixture::new(2);
    let mut object = fx.bound_object();
    let list = object.get_active_command_list(false).unwrap();
    let old_handle = fx.pipeline.handle().unwrap();

    fx.pipeline.rebuild(&fx.loader, RENDER_PASS, Extent2D::new(1024, 768)).unwrap();
    let new_handle = fx.pipeline.handle().unwrap();
    assert_ne!(new_handle, old_handle);
    assert!(object.is_dirty());

    assert_eq!(object.get_active_command_list(false).unwrap(), list);
    assert_eq!(object.rebuild_count(), 2);
    assert_eq!(fx.mock.commands(list)[1], format!("bind_pipeline({})", new_handle.as_raw()));
    assert!(!object.is_dirty());
}

#[test]
fn test_slot_count_change_reallocates_lists() {
    let fx = Fixture::new(2);
    let mut object = fx.bound_object();
    object.get_active_command_list(false).unwrap();
    let old_lists = object.command_lists().to_vec();

    fx.targets.publish(RENDER_PASS, framebuffers(3), Extent2D::new(800, 600));
    object.get_active_command_list(false).unwrap();

    assert_eq!(object.command_lists().len(), 3);
    assert_eq!(fx.mock.live_count("command_list"), 3);
    for list in old_lists {
        assert!(fx.mock.command_list(list).is_none());
    }
}

#[test]
fn test_destroyed_pipeline_keeps_object_dirty() {
    let fx = Fixture::new(2);
    let mut object = fx.bound_object();

    fx.pipeline.destroy();
    assert!(matches!(object.get_active_command_list(false), Err(Error::InvalidResource(_))));
    assert!(object.is_dirty());
    assert_eq!(object.rebuild_count(), 0);
}

#[test]
fn test_recording_failure_keeps_object_dirty() {
    let fx = Fixture::new(2);
    let mut object = fx.bound_object();

    fx.mock.fail_on("end_command_list");
    assert!(matches!(object.get_active_command_list(false), Err(Error::DeviceError(_))));
    assert!(object.is_dirty());

    fx.mock.clear_failures();
    object.get_active_command_list(false).unwrap();
    assert!(!object.is_dirty());
}

#[test]
fn test_retired_surface_rejects_lookup() {
    let fx = Fixture::new(2);
    let mut object = fx.bound_object();
    object.get_active_command_list(false).unwrap();

    fx.targets.retire();
    assert!(matches!(object.get_active_command_list(false), Err(Error::InvalidResource(_))));
}

#[test]
fn test_drop_releases_pool_lists_and_buffers() {
    let fx = Fixture::new(2);
    let baseline = fx.mock.live_objects();

    let mut object = fx.bound_object();
    object.get_active_command_list(false).unwrap();
    assert!(fx.mock.live_objects() > baseline);

    drop(object);
    assert_eq!(fx.mock.live_objects(), baseline);
}
