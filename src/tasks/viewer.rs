mod scenes;
mod state;

use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use glam::Vec2;
use scenes::{RenderCtx, Scene, SceneContext, gallery::GalleryScene, hero::HeroScene};
use state::{Section, SectionSM};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};
use wgpu::{self, SurfaceError};
use winit::{
    application::ApplicationHandler,
    event::{ElementState, KeyEvent, MouseScrollDelta, WindowEvent},
    event_loop::{ActiveEventLoop, EventLoop},
    keyboard::{Key, NamedKey},
    window::{Fullscreen, Window, WindowAttributes},
};

use crate::{
    config::Configuration,
    events::{TextureEvent, ViewerCommand},
    gallery::picking::{HoverTracker, cursor_to_ndc},
    gpu::texture::TextureCache,
    stage::{FrameClock, Stage},
    tasks::autoplay,
};

#[derive(Debug)]
enum ViewerEvent {
    Cancelled,
}

type TextureReceiver = mpsc::Receiver<TextureEvent>;
type CommandReceiver = mpsc::Receiver<ViewerCommand>;
type CommandSender = mpsc::Sender<ViewerCommand>;

/// What a key press asks the viewer to do.
#[derive(Debug, Clone, Copy, PartialEq)]
enum KeyAction {
    Command(ViewerCommand),
    ScrollPages(f32),
    Exit,
}

fn key_action(key: &Key) -> Option<KeyAction> {
    match key {
        Key::Named(NamedKey::Tab) => Some(KeyAction::Command(ViewerCommand::ToggleSection)),
        Key::Named(NamedKey::ArrowRight) | Key::Named(NamedKey::Space) => {
            Some(KeyAction::Command(ViewerCommand::AdvanceSlide))
        }
        Key::Named(NamedKey::PageDown) => Some(KeyAction::ScrollPages(1.0)),
        Key::Named(NamedKey::PageUp) => Some(KeyAction::ScrollPages(-1.0)),
        Key::Named(NamedKey::Escape) => Some(KeyAction::Exit),
        Key::Character(text) => match text.as_str() {
            "q" | "Q" => Some(KeyAction::Exit),
            digit => match digit.parse::<usize>() {
                Ok(n @ 1..=9) => Some(KeyAction::Command(ViewerCommand::SelectSlide(n - 1))),
                _ => None,
            },
        },
        _ => None,
    }
}

fn window_title(base: &str, slide: usize, total: usize) -> String {
    if total == 0 {
        return base.to_string();
    }
    format!("{base} · {}/{}", slide + 1, total)
}

struct ViewerApp {
    cfg: Configuration,
    cancel: CancellationToken,
    stage: Stage,
    sections: SectionSM,
    clock: FrameClock,
    hover: HoverTracker,
    cursor: Option<Vec2>,
    window: Option<Arc<Window>>,
    surface: Option<wgpu::Surface<'static>>,
    surface_config: Option<wgpu::SurfaceConfiguration>,
    device: Option<wgpu::Device>,
    queue: Option<wgpu::Queue>,
    textures: Option<TextureCache>,
    hero_scene: Option<HeroScene>,
    gallery_scene: Option<GalleryScene>,
    from_loader: TextureReceiver,
    control: CommandReceiver,
    control_tx: CommandSender,
}

impl ViewerApp {
    fn new(
        cfg: Configuration,
        cancel: CancellationToken,
        from_loader: TextureReceiver,
        control: CommandReceiver,
        control_tx: CommandSender,
    ) -> Self {
        let stage = Stage::from_config(&cfg);
        let sections = SectionSM::new(cfg.viewer.start_section.into(), Instant::now());
        Self {
            cfg,
            cancel,
            stage,
            sections,
            clock: FrameClock::default(),
            hover: HoverTracker::default(),
            cursor: None,
            window: None,
            surface: None,
            surface_config: None,
            device: None,
            queue: None,
            textures: None,
            hero_scene: None,
            gallery_scene: None,
            from_loader,
            control,
            control_tx,
        }
    }

    fn ensure_window(&mut self, event_loop: &ActiveEventLoop) -> Option<Arc<Window>> {
        if let Some(window) = self.window.as_ref() {
            return Some(window.clone());
        }

        let hero = self.stage.hero();
        let title = window_title(
            self.cfg.viewer.title_or_default(),
            hero.active_index(),
            hero.slides().len(),
        );
        let mut attrs = WindowAttributes::default().with_title(title);
        if self.cfg.viewer.fullscreen {
            attrs = attrs.with_fullscreen(Some(Fullscreen::Borderless(None)));
        }
        match event_loop.create_window(attrs) {
            Ok(window) => {
                let window = Arc::new(window);
                self.window = Some(window.clone());
                Some(window)
            }
            Err(err) => {
                error!(error = %err, "failed to create viewer window");
                None
            }
        }
    }

    fn init_gpu(&mut self, window: Arc<Window>) -> Result<()> {
        let instance = wgpu::Instance::default();
        let surface = instance
            .create_surface(window.clone())
            .context("failed to create surface")?;
        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))
        .context("failed to acquire GPU adapter")?;

        let caps = surface.get_capabilities(&adapter);
        let format = caps
            .formats
            .iter()
            .copied()
            .find(|fmt| fmt.is_srgb())
            .or_else(|| caps.formats.first().copied())
            .context("surface reports no supported formats")?;
        let alpha_mode = caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        let (device, queue) = pollster::block_on(adapter.request_device(&wgpu::DeviceDescriptor {
            label: Some("viewer-device"),
            required_features: wgpu::Features::empty(),
            required_limits: adapter.limits(),
            ..Default::default()
        }))
        .context("failed to acquire GPU device")?;

        let size = window.inner_size();
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);
        info!(
            width = config.width,
            height = config.height,
            format = ?config.format,
            "viewer surface configured",
        );

        let autoplay = autoplay::spawn(
            self.cfg.hero.effective_auto_advance(),
            self.control_tx.clone(),
            &self.cancel,
        );
        let textures = TextureCache::new(&device, &queue);
        let hero_scene = HeroScene::new(&device, format, autoplay);
        let gallery_scene = GalleryScene::new(&device, format);

        self.surface = Some(surface);
        self.surface_config = Some(config);
        self.device = Some(device);
        self.queue = Some(queue);
        self.textures = Some(textures);
        self.hero_scene = Some(hero_scene);
        self.gallery_scene = Some(gallery_scene);

        self.enter_section(self.sections.current());
        Ok(())
    }

    fn with_scene_context(&mut self, section: Section, f: impl FnOnce(&mut dyn Scene, &SceneContext)) {
        let (Some(device), Some(queue), Some(config)) = (
            self.device.as_ref(),
            self.queue.as_ref(),
            self.surface_config.as_ref(),
        ) else {
            return;
        };
        let ctx = SceneContext {
            device,
            queue,
            surface_config: config,
        };
        let scene: Option<&mut dyn Scene> = match section {
            Section::Hero => self.hero_scene.as_mut().map(|s| s as &mut dyn Scene),
            Section::Gallery => self.gallery_scene.as_mut().map(|s| s as &mut dyn Scene),
        };
        if let Some(scene) = scene {
            f(scene, &ctx);
        }
    }

    fn enter_section(&mut self, section: Section) {
        self.with_scene_context(section, |scene, ctx| scene.on_enter(ctx));
    }

    fn exit_section(&mut self, section: Section) {
        self.with_scene_context(section, |scene, ctx| scene.on_exit(ctx));
    }

    fn apply_command(&mut self, command: ViewerCommand) {
        let now = Instant::now();
        let spent = self.sections.time_in_section(now);
        if let Some(change) = self.sections.on_command(&command, now) {
            info!(from = ?change.from, to = ?change.to, after = ?spent, "viewer section changed");
            self.exit_section(change.from);
            self.enter_section(change.to);
            if change.to != Section::Gallery {
                self.clear_hover();
            }
            return;
        }
        self.stage.apply_command(command);
    }

    fn drain_channels(&mut self) {
        while let Ok(command) = self.control.try_recv() {
            debug!(?command, "viewer command");
            self.apply_command(command);
        }
        while let Ok(event) = self.from_loader.try_recv() {
            let event = self.upload(event);
            self.stage.apply_texture_event(&event);
        }
    }

    /// Upload a loaded texture. A rejected upload is reported as a failed
    /// load so the asset keeps the fallback texture and size.
    fn upload(&mut self, event: TextureEvent) -> TextureEvent {
        let texture = match event {
            TextureEvent::Loaded(texture) => texture,
            other => return other,
        };
        let (Some(cache), Some(device), Some(queue)) = (
            self.textures.as_mut(),
            self.device.as_ref(),
            self.queue.as_ref(),
        ) else {
            return TextureEvent::Loaded(texture);
        };
        match cache.insert(device, queue, &texture) {
            Ok(()) => TextureEvent::Loaded(texture),
            Err(err) => {
                warn!(path = %texture.path.display(), error = %err, "texture upload rejected");
                TextureEvent::Failed {
                    id: texture.id,
                    path: texture.path,
                    reason: err.to_string(),
                }
            }
        }
    }

    fn surface_px(&self) -> Vec2 {
        self.surface_config
            .as_ref()
            .map(|config| Vec2::new(config.width as f32, config.height as f32))
            .unwrap_or(Vec2::ONE)
            .max(Vec2::ONE)
    }

    fn clear_hover(&mut self) {
        for event in self.hover.clear() {
            if let Err(err) = self.stage.gallery_mut().apply_pointer(event) {
                warn!(error = %err, "dropping pointer event");
            }
        }
    }

    fn update_hover(&mut self) {
        if self.sections.current() != Section::Gallery {
            return;
        }
        let Some(cursor) = self.cursor else {
            self.clear_hover();
            return;
        };
        let surface = self.surface_px();
        let hit = self
            .stage
            .gallery()
            .pick(cursor_to_ndc(cursor, surface), surface.x / surface.y);
        for event in self.hover.update(hit) {
            if let Err(err) = self.stage.gallery_mut().apply_pointer(event) {
                warn!(error = %err, "dropping pointer event");
            }
        }
    }

    fn update_title(&self) {
        if let Some(window) = self.window.as_ref() {
            let hero = self.stage.hero();
            window.set_title(&window_title(
                self.cfg.viewer.title_or_default(),
                hero.transition().last_index(),
                hero.slides().len(),
            ));
        }
    }

    fn handle_key(&mut self, event_loop: &ActiveEventLoop, event: &KeyEvent) {
        if event.state != ElementState::Pressed {
            return;
        }
        match key_action(&event.logical_key) {
            Some(KeyAction::Command(command)) => self.apply_command(command),
            Some(KeyAction::ScrollPages(pages)) => {
                if self.sections.current() != Section::Gallery {
                    return;
                }
                let height = self.surface_px().y;
                self.stage.gallery_mut().scroll_by_pages(pages, height);
            }
            Some(KeyAction::Exit) => {
                info!("viewer exit requested from keyboard");
                event_loop.exit();
            }
            None => {}
        }
    }

    fn handle_wheel(&mut self, delta: MouseScrollDelta) {
        if self.sections.current() != Section::Gallery {
            return;
        }
        let height = self.surface_px().y;
        let gallery = self.stage.gallery_mut();
        // Wheel up reports positive y and scrolls back toward the start.
        match delta {
            MouseScrollDelta::LineDelta(_, y) => gallery.scroll_by_lines(-y, height),
            MouseScrollDelta::PixelDelta(pos) => gallery.scroll_by_pixels(-(pos.y as f32), height),
        }
    }

    fn handle_resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        let (Some(surface), Some(device), Some(config)) = (
            self.surface.as_ref(),
            self.device.as_ref(),
            self.surface_config.as_mut(),
        ) else {
            return;
        };

        config.width = new_size.width.max(1);
        config.height = new_size.height.max(1);
        surface.configure(device, config);
        debug!(
            width = config.width,
            height = config.height,
            "viewer surface resized",
        );
        self.request_redraw();
    }

    fn frame(&mut self) {
        self.drain_channels();
        let tick = self.clock.tick(Instant::now());
        if self.stage.tick(tick.delta).is_some() {
            self.update_title();
        }
        self.update_hover();
    }

    fn draw(&mut self, event_loop: &ActiveEventLoop) {
        self.frame();

        let (Some(surface), Some(device), Some(queue), Some(config), Some(window), Some(textures)) = (
            self.surface.as_ref(),
            self.device.as_ref(),
            self.queue.as_ref(),
            self.surface_config.as_ref(),
            self.window.as_ref(),
            self.textures.as_ref(),
        ) else {
            return;
        };

        let frame = match surface.get_current_texture() {
            Ok(frame) => frame,
            Err(SurfaceError::Outdated) | Err(SurfaceError::Lost) => {
                info!("viewer surface lost; reconfiguring");
                let size = window.inner_size();
                self.handle_resize(size);
                return;
            }
            Err(SurfaceError::OutOfMemory) => {
                error!("viewer surface out of memory; exiting event loop");
                event_loop.exit();
                return;
            }
            Err(SurfaceError::Timeout) => {
                warn!("viewer surface acquisition timed out");
                return;
            }
            Err(SurfaceError::Other) => {
                warn!("viewer surface reported an unknown error; retrying");
                let size = window.inner_size();
                self.handle_resize(size);
                return;
            }
        };

        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("viewer-encoder"),
        });

        let scene: Option<&mut dyn Scene> = match self.sections.current() {
            Section::Hero => self.hero_scene.as_mut().map(|s| s as &mut dyn Scene),
            Section::Gallery => self.gallery_scene.as_mut().map(|s| s as &mut dyn Scene),
        };
        if let Some(scene) = scene {
            let ctx = SceneContext {
                device,
                queue,
                surface_config: config,
            };
            scene.prepare(&ctx, &self.stage, textures);
            let mut render_ctx = RenderCtx {
                scene: ctx,
                encoder: &mut encoder,
                target_view: &view,
            };
            scene.render(&mut render_ctx);
        }

        queue.submit(std::iter::once(encoder.finish()));
        window.pre_present_notify();
        frame.present();
    }

    fn request_redraw(&self) {
        if let Some(window) = self.window.as_ref() {
            window.request_redraw();
        }
    }
}

impl ApplicationHandler<ViewerEvent> for ViewerApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.cancel.is_cancelled() {
            event_loop.exit();
            return;
        }

        let Some(window) = self.ensure_window(event_loop) else {
            event_loop.exit();
            return;
        };

        if self.device.is_none() {
            if let Err(err) = self.init_gpu(window) {
                error!(error = ?err, "failed to initialize GPU state");
                event_loop.exit();
                return;
            }
        }

        self.request_redraw();
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        window_id: winit::window::WindowId,
        event: WindowEvent,
    ) {
        let Some(window) = self.window.as_ref() else {
            return;
        };
        if window.id() != window_id {
            return;
        }

        match event {
            WindowEvent::CloseRequested => {
                info!("viewer window close requested");
                event_loop.exit();
            }
            WindowEvent::Resized(new_size) => {
                self.handle_resize(new_size);
            }
            WindowEvent::ScaleFactorChanged {
                mut inner_size_writer,
                ..
            } => {
                let size = window.inner_size();
                let _ = inner_size_writer.request_inner_size(size);
                self.handle_resize(size);
            }
            WindowEvent::KeyboardInput { event, .. } => {
                self.handle_key(event_loop, &event);
            }
            WindowEvent::MouseWheel { delta, .. } => {
                self.handle_wheel(delta);
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.cursor = Some(Vec2::new(position.x as f32, position.y as f32));
            }
            WindowEvent::CursorLeft { .. } => {
                self.cursor = None;
            }
            WindowEvent::RedrawRequested => {
                self.draw(event_loop);
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        // Both sections animate continuously.
        self.request_redraw();
    }

    fn user_event(&mut self, event_loop: &ActiveEventLoop, event: ViewerEvent) {
        match event {
            ViewerEvent::Cancelled => {
                info!("viewer received cancellation event");
                event_loop.exit();
            }
        }
    }
}

pub fn run_windowed(
    from_loader: TextureReceiver,
    cancel: CancellationToken,
    cfg: Configuration,
    control: CommandReceiver,
    control_tx: CommandSender,
) -> Result<()> {
    let event_loop = EventLoop::<ViewerEvent>::with_user_event()
        .build()
        .context("failed to build viewer event loop")?;
    let proxy = event_loop.create_proxy();

    let cancel_task = {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            cancel.cancelled().await;
            let _ = proxy.send_event(ViewerEvent::Cancelled);
        })
    };

    let mut app = ViewerApp::new(cfg, cancel, from_loader, control, control_tx);
    let run_result = event_loop.run_app(&mut app);
    cancel_task.abort();

    run_result.context("viewer event loop failed")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digit_keys_select_zero_based_slides() {
        let key = Key::Character("3".into());
        assert_eq!(
            key_action(&key),
            Some(KeyAction::Command(ViewerCommand::SelectSlide(2)))
        );
        assert_eq!(key_action(&Key::Character("0".into())), None);
    }

    #[test]
    fn named_keys_map_to_actions() {
        assert_eq!(
            key_action(&Key::Named(NamedKey::Tab)),
            Some(KeyAction::Command(ViewerCommand::ToggleSection))
        );
        assert_eq!(
            key_action(&Key::Named(NamedKey::Space)),
            Some(KeyAction::Command(ViewerCommand::AdvanceSlide))
        );
        assert_eq!(key_action(&Key::Named(NamedKey::PageUp)), Some(KeyAction::ScrollPages(-1.0)));
        assert_eq!(key_action(&Key::Character("q".into())), Some(KeyAction::Exit));
    }

    fn app() -> ViewerApp {
        let (_loader_tx, loader_rx) = mpsc::channel(1);
        let (control_tx, control_rx) = mpsc::channel(1);
        ViewerApp::new(
            Configuration::default(),
            CancellationToken::new(),
            loader_rx,
            control_rx,
            control_tx,
        )
    }

    #[test]
    fn wheel_scrolls_the_ring_only_in_the_gallery() {
        let mut app = app();
        assert_eq!(app.sections.current(), Section::Hero);
        app.handle_wheel(MouseScrollDelta::LineDelta(0.0, -3.0));
        assert_eq!(app.stage.gallery().scroll().raw(), 0.0);

        app.apply_command(ViewerCommand::ToggleSection);
        assert_eq!(app.sections.current(), Section::Gallery);
        app.handle_wheel(MouseScrollDelta::LineDelta(0.0, -3.0));
        assert!(app.stage.gallery().scroll().raw() > 0.0);
    }

    #[test]
    fn title_shows_one_based_slide() {
        assert_eq!(window_title("Showcase", 1, 3), "Showcase · 2/3");
        assert_eq!(window_title("Showcase", 0, 0), "Showcase");
    }
}
