//! User settings and the settings dialog on top of a two-tier cache.

mod common;

use common::{tiered_with, SwitchableRemote};
use gpt_ai_translator::cache::RemoteCache;
use gpt_ai_translator::settings::DEFAULT_TRANSLATE_LANGUAGE;
use gpt_ai_translator::{Reply, SettingsDialog, UserSettingsManager};
use serde_json::json;
use std::sync::Arc;

fn manager(remote: &Arc<SwitchableRemote>) -> UserSettingsManager {
    UserSettingsManager::new(Arc::new(tiered_with(16, remote)), "gpt-ai-translator")
}

#[tokio::test]
async fn test_settings_survive_process_restart() {
    let remote = Arc::new(SwitchableRemote::default());

    let first = manager(&remote);
    first.ensure_initialized("U1").await.unwrap();
    first.set_translate_language("U1", "Vietnamese").await.unwrap();

    // A new process starts with an empty local tier.
    let second = manager(&remote);
    let prefs = second.preferences("U1").await.unwrap();
    assert_eq!(prefs.translate_language, "Vietnamese");
    assert_eq!(
        remote.inner.get("gpt-ai-translator.U1.settings").await.unwrap(),
        Some(json!({
            "translate_language": "Vietnamese",
            "audio_language": "Traditional Chinese"
        }))
    );
}

#[tokio::test]
async fn test_get_settings_surfaces_remote_outage() {
    let remote = Arc::new(SwitchableRemote::default());
    let settings = manager(&remote);
    remote.set_offline(true);

    let err = settings.get_settings("U2").await.unwrap_err();
    assert!(err.is_remote_unavailable());
}

#[tokio::test]
async fn test_dialog_degrades_to_defaults_when_remote_down() {
    let remote = Arc::new(SwitchableRemote::default());
    let dialog = SettingsDialog::new(manager(&remote));
    remote.set_offline(true);

    let reply = dialog.handle_text("U3", "你好").await.unwrap();
    assert_eq!(
        reply,
        Reply::Translate {
            text: "你好".into(),
            target_language: DEFAULT_TRANSLATE_LANGUAGE.into(),
        }
    );
}

#[tokio::test]
async fn test_dialog_keeps_local_choice_during_outage() {
    let remote = Arc::new(SwitchableRemote::default());
    let dialog = SettingsDialog::new(manager(&remote));
    dialog.handle_text("U4", "目前設定").await.unwrap();

    remote.set_offline(true);
    dialog
        .handle_text("U4", "設定打字後翻譯為 韓文")
        .await
        .unwrap();
    let reply = dialog.handle_text("U4", "안녕").await.unwrap();
    assert_eq!(
        reply,
        Reply::Translate {
            text: "안녕".into(),
            target_language: "Korean".into(),
        }
    );
}

#[tokio::test]
async fn test_outage_write_for_uncached_user_stays_local() {
    let remote = Arc::new(SwitchableRemote::default());
    let cache = Arc::new(tiered_with(16, &remote));
    let dialog = SettingsDialog::new(UserSettingsManager::new(Arc::clone(&cache), "bot"));
    remote.set_offline(true);

    let reply = dialog
        .handle_text("U9", "設定打字後翻譯為 德文")
        .await
        .unwrap();
    assert_eq!(
        reply,
        Reply::Text("設定完畢！\n我方語言：繁體中文（Traditional Chinese）\n對方語言：德文（German）".into())
    );
    assert!(cache.local().contains("bot.U9.settings"));

    let reply = dialog.handle_text("U9", "hallo").await.unwrap();
    assert_eq!(
        reply,
        Reply::Translate {
            text: "hallo".into(),
            target_language: "German".into(),
        }
    );
}

#[tokio::test]
async fn test_set_settings_reports_outage_after_local_write() {
    let remote = Arc::new(SwitchableRemote::default());
    let cache = Arc::new(tiered_with(16, &remote));
    let settings = UserSettingsManager::new(Arc::clone(&cache), "bot");
    remote.set_offline(true);

    let err = settings
        .set_audio_language("U10", "Japanese")
        .await
        .unwrap_err();
    assert!(err.is_remote_unavailable());
    assert_eq!(
        cache.local().get("bot.U10.settings"),
        Some(json!({"audio_language": "Japanese"}))
    );
    assert_eq!(remote.inner.get("bot.U10.settings").await.unwrap(), None);
}
