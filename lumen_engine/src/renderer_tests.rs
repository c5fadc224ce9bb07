use super::*;
use crate::device::mock_graphics_device::{MockGraphicsDevice, MockSurfaceSource};
use crate::device::{AcquireOutcome, SurfaceCapabilities};
use crate::error::Error;
use crate::pipeline::InMemoryShaderLoader;
use crate::pipeline::shader_loader::{FRAGMENT_SHADER_FILE, VERTEX_SHADER_FILE};
use crate::scene::MeshData;
use crate::surface::SurfaceState;

// ============================================================================
// HELPERS
// ============================================================================

fn renderer_with(mock: MockGraphicsDevice, names: &[&str]) -> (Arc<MockGraphicsDevice>, Renderer) {
    let mock = Arc::new(mock);
    let device: Arc<dyn GraphicsDevice> = mock.clone();
    let mut loader = InMemoryShaderLoader::new();
    for name in names {
        loader.insert(*name, vec![1; 8], vec![2; 8]);
    }
    let renderer = Renderer::new(device, RendererConfig::default(), names)
        .unwrap()
        .with_shader_loader(Arc::new(loader));
    (mock, renderer)
}

fn source() -> Arc<dyn SurfaceSource + Send + Sync> {
    Arc::new(MockSurfaceSource)
}

// ============================================================================
// CONTEXT
// ============================================================================

#[test]
fn test_new_rejects_duplicate_pipeline_names() {
    let device: Arc<dyn GraphicsDevice> = Arc::new(MockGraphicsDevice::new());
    let result = Renderer::new(device, RendererConfig::default(), &["default", "sky", "default"]);
    assert!(matches!(result, Err(Error::ConfigurationError(_))));
}

#[test]
fn test_accessors() {
    let (_mock, renderer) = renderer_with(MockGraphicsDevice::new(), &["default", "sky"]);
    assert_eq!(renderer.pipeline_names(), &["default".to_string(), "sky".to_string()]);
    assert_eq!(renderer.config().preferred_slot_count, 2);
    assert_eq!(renderer.next_window_id(), 1);
}

#[test]
fn test_open_window_assigns_unique_ids() {
    let (_mock, mut renderer) = renderer_with(MockGraphicsDevice::new(), &["default", "sky"]);

    let first = renderer.open_window(source(), Extent2D::new(800, 600), "first").unwrap();
    let second = renderer.open_window(source(), Extent2D::new(640, 480), "second").unwrap();

    assert_eq!(first.id(), 1);
    assert_eq!(second.id(), 2);
    assert_eq!(second.name(), "second");
    assert_eq!(first.targets().window_id(), 1);
    assert_eq!(first.pipelines().len(), 2);
    assert!(first.find_pipeline("sky").is_some());
    assert!(!Arc::ptr_eq(
        &first.find_pipeline("default").unwrap(),
        &second.find_pipeline("default").unwrap(),
    ));
}

#[test]
fn test_failed_open_consumes_id() {
    let (mock, mut renderer) = renderer_with(MockGraphicsDevice::new(), &["default"]);

    mock.fail_on("create_swapchain");
    assert!(matches!(
        renderer.open_window(source(), Extent2D::new(800, 600), "broken"),
        Err(Error::DeviceError(_))
    ));
    assert_eq!(mock.live_objects(), 0);

    mock.clear_failures();
    let window = renderer.open_window(source(), Extent2D::new(800, 600), "ok").unwrap();
    assert_eq!(window.id(), 2);
}

#[test]
fn test_missing_pipeline_binaries_fail_open() {
    let (_mock, mut renderer) = renderer_with(MockGraphicsDevice::new(), &["default"]);
    let mut renderer_without = Renderer::new(
        Arc::clone(renderer.device()),
        RendererConfig::default(),
        &["default", "unknown"],
    )
    .unwrap()
    .with_shader_loader(Arc::new(InMemoryShaderLoader::new().with("default", vec![1], vec![2])));

    assert!(renderer.open_window(source(), Extent2D::new(8, 8), "ok").is_ok());
    assert!(matches!(
        renderer_without.open_window(source(), Extent2D::new(8, 8), "broken"),
        Err(Error::ConfigurationError(_))
    ));
}

#[test]
fn test_file_shader_loader_from_config_root() {
    let dir = tempfile::tempdir().unwrap();
    let pipeline_dir = dir.path().join("default");
    std::fs::create_dir_all(&pipeline_dir).unwrap();
    std::fs::write(pipeline_dir.join(VERTEX_SHADER_FILE), [3u8; 12]).unwrap();
    std::fs::write(pipeline_dir.join(FRAGMENT_SHADER_FILE), [4u8; 20]).unwrap();

    let mock = Arc::new(MockGraphicsDevice::new());
    let device: Arc<dyn GraphicsDevice> = mock.clone();
    let config = RendererConfig {
        pipeline_root: dir.path().to_path_buf(),
        ..RendererConfig::default()
    };
    let mut renderer = Renderer::new(device, config, &["default"]).unwrap();

    let window = renderer.open_window(source(), Extent2D::new(800, 600), "files").unwrap();
    assert_eq!(window.pipelines().len(), 1);
    assert_eq!(mock.shader_module_sizes(), vec![12, 20]);
}

// ============================================================================
// END TO END
// ============================================================================

#[test]
fn test_cached_lists_follow_frame_slots() {
    let (mock, mut renderer) = renderer_with(MockGraphicsDevice::new(), &["default"]);
    let mut window = renderer.open_window(source(), Extent2D::new(800, 600), "main").unwrap();
    assert_eq!(window.slot_count(), 2);

    let mut scene = renderer.create_scene();
    let key = scene.create_dynamic_mesh(scene.root(), &MeshData::triangle()).unwrap();
    {
        let object = scene.object_mut(key).unwrap();
        object.set_surface(Arc::clone(window.targets()));
        object.set_pipeline(window.find_pipeline("default").unwrap());
    }

    // first call records both slots and returns slot 0's list
    let first = scene.object_mut(key).unwrap().get_active_command_list(false).unwrap();
    let lists = scene.object(key).unwrap().command_lists().to_vec();
    assert_eq!(lists.len(), 2);
    assert_eq!(first, lists[0]);
    assert_eq!(scene.object(key).unwrap().rebuild_count(), 1);

    let outcome = window.render(&[first]).unwrap();
    assert_eq!(outcome, AcquireOutcome::Ready(1));
    assert_eq!(window.current_slot(), 1);
    assert_eq!(mock.executed_batches().last().unwrap(), &vec![lists[0]]);

    // cached slot-1 list, no re-recording
    let second = scene.object_mut(key).unwrap().get_active_command_list(false).unwrap();
    assert_eq!(second, lists[1]);
    assert_eq!(scene.object(key).unwrap().rebuild_count(), 1);
    assert_eq!(mock.begin_count(lists[1]), 1);
}

#[test]
fn test_render_scene_runs_frames() {
    let (mock, mut renderer) = renderer_with(MockGraphicsDevice::new(), &["default"]);
    let mut window = renderer.open_window(source(), Extent2D::new(800, 600), "main").unwrap();
    let mut scene = renderer.create_scene();

    let child = scene.create_child_scene(scene.root()).unwrap();
    for node in [scene.root(), child] {
        let key = scene.create_dynamic_mesh(node, &MeshData::triangle()).unwrap();
        let object = scene.object_mut(key).unwrap();
        object.set_surface(Arc::clone(window.targets()));
        object.set_pipeline(window.find_pipeline("default").unwrap());
    }

    for _ in 0..4 {
        scene.update().unwrap();
        window.render_scene(&mut scene, false).unwrap();
        assert!(window.current_slot() < window.slot_count());
    }

    assert_eq!(window.frames_presented(), 4);
    assert_eq!(window.state(), SurfaceState::AcquirePending);
    assert!(mock.executed_batches().iter().all(|batch| batch.len() == 2));
}

#[test]
fn test_resize_invalidates_bound_objects() {
    let mock = MockGraphicsDevice::new().with_capabilities(SurfaceCapabilities {
        min_image_count: 2,
        max_image_count: 3,
        current_extent: None,
        min_image_extent: Extent2D::new(1, 1),
        max_image_extent: Extent2D::new(1024, 1024),
    });
    let (mock, mut renderer) = renderer_with(mock, &["default"]);
    let mut window = renderer.open_window(source(), Extent2D::new(800, 600), "main").unwrap();
    let pipeline = window.find_pipeline("default").unwrap();

    let mut scene = renderer.create_scene();
    let key = scene.create_dynamic_mesh(scene.root(), &MeshData::triangle()).unwrap();
    {
        let object = scene.object_mut(key).unwrap();
        object.set_surface(Arc::clone(window.targets()));
        object.set_pipeline(Arc::clone(&pipeline));
        object.get_active_command_list(false).unwrap();
        assert!(!object.is_dirty());
    }

    let used = window.resize(Extent2D::new(2000, 500)).unwrap();
    assert_eq!(used, Extent2D::new(1024, 500));

    let object = scene.object_mut(key).unwrap();
    assert!(object.is_dirty());
    let list = object.get_active_command_list(false).unwrap();
    assert_eq!(object.rebuild_count(), 2);
    assert!(!object.is_dirty());

    // the pipeline was rebuilt in place and the list binds the new handle
    assert!(Arc::ptr_eq(&pipeline, &window.find_pipeline("default").unwrap()));
    assert_eq!(mock.commands(list)[1], format!("bind_pipeline({})", pipeline.handle().unwrap().as_raw()));
    let inheritance = mock.command_list(list).unwrap().inheritance.unwrap();
    assert_eq!(inheritance.render_pass, window.targets().render_pass());
}

#[test]
fn test_resizing_pipeline_owner_invalidates_objects_of_other_windows() {
    let (mock, mut renderer) = renderer_with(MockGraphicsDevice::new(), &["default"]);
    let main = renderer.open_window(source(), Extent2D::new(800, 600), "main").unwrap();
    let mut side = renderer.open_window(source(), Extent2D::new(640, 480), "side").unwrap();
    let side_pipeline = side.find_pipeline("default").unwrap();

    let mut scene = renderer.create_scene();
    let key = scene.create_dynamic_mesh(scene.root(), &MeshData::triangle()).unwrap();
    let object = scene.object_mut(key).unwrap();
    object.set_surface(Arc::clone(main.targets()));
    object.set_pipeline(Arc::clone(&side_pipeline));
    object.get_active_command_list(false).unwrap();
    let old_handle = side_pipeline.handle().unwrap();

    // main's targets keep their generation; only the pipeline changed
    side.resize(Extent2D::new(320, 240)).unwrap();
    let new_handle = side_pipeline.handle().unwrap();
    assert_ne!(new_handle, old_handle);

    let object = scene.object_mut(key).unwrap();
    assert!(object.is_dirty());
    let list = object.get_active_command_list(false).unwrap();
    assert_eq!(object.rebuild_count(), 2);
    assert_eq!(mock.commands(list)[1], format!("bind_pipeline({})", new_handle.as_raw()));
}
