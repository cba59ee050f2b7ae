use gpui::{
    App, Application, Context, Entity, Render, Window, WindowOptions, div, prelude::*, rgb,
};
use gpui_hover_video_player::{
    HoverVideoPlayer, HoverVideoPlayerConfig, HoverVideoPlayerEvent, Overlays, SizingMode,
};
use serde_json::json;
use std::path::PathBuf;

struct HoverGallery {
    players: Vec<Entity<HoverVideoPlayer>>,
    pinned: bool,
}

impl HoverGallery {
    fn new(window: &mut Window, cx: &mut Context<Self>) -> Self {
        let assets = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("assets");
        let asset = |name: &str| assets.join(name).to_string_lossy().into_owned();

        let configs = [
            HoverVideoPlayerConfig::new(asset("test.mp4")),
            HoverVideoPlayerConfig::new(json!([
                { "src": asset("test2.webm"), "type": "video/webm" },
                asset("test2.mp4"),
            ]))
            .unload_on_pause(true),
            HoverVideoPlayerConfig::new(asset("test3.mp4"))
                .restart_on_pause(true)
                .video_captions(json!({ "src": asset("test3.srt"), "srcLang": "en", "label": "English" })),
        ];

        let mut players = Vec::new();
        for config in configs {
            let overlays = Overlays::new()
                .paused(|_, _| {
                    div()
                        .size_full()
                        .bg(rgb(0x111827))
                        .flex()
                        .items_center()
                        .justify_center()
                        .child("Hover to play")
                })
                .loading(|_, _| {
                    div()
                        .size_full()
                        .flex()
                        .items_center()
                        .justify_center()
                        .child("Loading…")
                });

            match HoverVideoPlayer::build(config.sizing_mode(SizingMode::Video), overlays, window, cx) {
                Ok(player) => {
                    cx.subscribe(&player, |_, _, event: &HoverVideoPlayerEvent, _| {
                        log::info!("player event: {event:?}");
                    })
                    .detach();
                    players.push(player);
                }
                Err(err) => log::error!("failed to create player: {err}"),
            }
        }

        Self {
            players,
            pinned: false,
        }
    }
}

impl Render for HoverGallery {
    fn render(&mut self, _window: &mut Window, cx: &mut Context<Self>) -> impl IntoElement {
        let pin_label = if self.pinned { "Unpin first preview" } else { "Pin first preview" };

        div()
            .size_full()
            .flex()
            .flex_col()
            .gap_4()
            .p_4()
            .child(
                div()
                    .id("btn-pin")
                    .px_4()
                    .py_2()
                    .border_1()
                    .cursor_pointer()
                    .child(pin_label)
                    .on_click(cx.listener(|this: &mut Self, _event, _window, cx| {
                        this.pinned = !this.pinned;
                        let pinned = this.pinned;
                        if let Some(first) = this.players.first() {
                            first.update(cx, |player, cx| player.set_focused(pinned, cx));
                        }
                        cx.notify();
                    })),
            )
            .child(
                div()
                    .flex()
                    .flex_wrap()
                    .gap_4()
                    .children(self.players.iter().cloned()),
            )
    }
}

fn main() {
    env_logger::init();
    Application::new().run(|cx: &mut App| {
        cx.open_window(
            WindowOptions {
                focus: true,
                ..Default::default()
            },
            |window, cx| cx.new(|cx| HoverGallery::new(window, cx)),
        )
        .unwrap();
        cx.activate(true);
    });
}
