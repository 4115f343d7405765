//! Observer-facing and client-facing message translation
//!
//! HTTP response bodies and event-stream frames are localized; the locale
//! is fixed at startup by `--locale`. Messages live in Fluent resources
//! embedded at compile time. Supported locales are `zh-CN` (the default)
//! and `en`; anything unrecognized falls back to `en`.
//!
//! Bundles are rebuilt per lookup: the resources are tiny and message
//! volume is one line per file operation.

use fluent::{FluentArgs, FluentBundle, FluentResource};
use unic_langid::LanguageIdentifier;

use depot_common::OperationRecord;
use depot_common::record::OperationKind;

const EN_FTL: &str = include_str!("../locales/en.ftl");
const ZH_CN_FTL: &str = include_str!("../locales/zh-CN.ftl");

fn bundle_for(locale: &str) -> FluentBundle<FluentResource> {
    let (tag, source) = if locale.to_ascii_lowercase().starts_with("zh") {
        ("zh-CN", ZH_CN_FTL)
    } else {
        ("en", EN_FTL)
    };

    let langid: LanguageIdentifier = tag.parse().expect("locale tag is valid");
    let resource =
        FluentResource::try_new(source.to_string()).expect("embedded locale resource is valid");

    let mut bundle = FluentBundle::new(vec![langid]);
    // Skip Unicode bidi isolation marks; frames go to plain-text consumers
    bundle.set_use_isolating(false);
    bundle
        .add_resource(resource)
        .expect("embedded locale resource has no duplicate messages");
    bundle
}

fn format(locale: &str, key: &str, args: Option<&FluentArgs>) -> String {
    let bundle = bundle_for(locale);

    let Some(message) = bundle.get_message(key) else {
        return key.to_string();
    };
    let Some(pattern) = message.value() else {
        return key.to_string();
    };

    let mut errors = Vec::new();
    bundle.format_pattern(pattern, args, &mut errors).into_owned()
}

/// Get a translated message with no arguments
#[must_use]
pub fn t(locale: &str, key: &str) -> String {
    format(locale, key, None)
}

/// Get a translated message with named arguments
#[must_use]
pub fn t_args(locale: &str, key: &str, args: &[(&str, &str)]) -> String {
    let mut fluent_args = FluentArgs::new();
    for (name, value) in args {
        fluent_args.set(*name, *value);
    }
    format(locale, key, Some(&fluent_args))
}

/// Format an operation record as one observer-facing event line
#[must_use]
pub fn format_event(locale: &str, record: &OperationRecord) -> String {
    let key = match record.kind {
        OperationKind::Uploaded => "event-uploaded",
        OperationKind::Downloaded => "event-downloaded",
        OperationKind::Deleted => "event-deleted",
        OperationKind::DeletedAll => "event-deleted-all",
        OperationKind::Connected => "event-connected",
        OperationKind::Disconnected => "event-disconnected",
    };

    let file = record.file_name.as_deref().unwrap_or_default();
    t_args(
        locale,
        key,
        &[
            ("file", file),
            ("address", &record.actor_address),
            ("time", &record.timestamp),
        ],
    )
}
