use directories::BaseDirs;
use seqfs_core::fs::platform;
use seqfs_core::{PathValue, SubstitutionContext, Substitutions};

#[test]
fn overrides_change_value_and_hash() {
    let value = PathValue::new("/${SEQFS_SHOT}/plate.exr");
    let mut context = SubstitutionContext::new();

    context.set("SEQFS_SHOT", "a");
    let (first_value, first_hash) = (value.value(&context), value.hash(&context));
    context.set("SEQFS_SHOT", "b");
    let (second_value, second_hash) = (value.value(&context), value.hash(&context));

    assert_eq!(first_value, "/a/plate.exr");
    assert_eq!(second_value, "/b/plate.exr");
    assert_ne!(first_hash, second_hash);
}

#[test]
fn disabled_substitutions_return_the_literal() {
    let value = PathValue::new("/${SEQFS_SHOT}/plate.exr").with_substitutions(Substitutions::NONE);
    let mut context = SubstitutionContext::new();

    context.set("SEQFS_SHOT", "a");
    let first = value.hash(&context);
    assert_eq!(value.value(&context), "/${SEQFS_SHOT}/plate.exr");
    context.set("SEQFS_SHOT", "b");
    assert_eq!(value.hash(&context), first);
    assert_eq!(value.value(&context), "/${SEQFS_SHOT}/plate.exr");

    let substituted = PathValue::new("/${SEQFS_SHOT}/plate.exr");
    assert_ne!(substituted.hash(&context), first);
}

#[test]
fn unresolved_variables_are_empty() {
    let value = PathValue::new("${SEQFS_SURELY_NOT_SET_ANYWHERE}");
    assert_eq!(value.value(&SubstitutionContext::new()), "");
}

#[test]
fn environment_is_the_fallback() {
    let Ok(home) = std::env::var("HOME") else { return };
    let value = PathValue::new("${HOME}");
    assert_eq!(value.value(&SubstitutionContext::new()), home.trim_end_matches('/'));

    let mut context = SubstitutionContext::new();
    context.set("HOME", "/elsewhere");
    assert_eq!(value.value(&context), "/elsewhere");
}

#[test]
fn tilde_expands_only_when_leading() {
    let home = BaseDirs::new().expect("home directory").home_dir().to_string_lossy().into_owned();
    let context = SubstitutionContext::new();

    assert_eq!(PathValue::new("~/something.tif").value(&context), format!("{home}/something.tif"));
    assert_eq!(PathValue::new("in ~1900").value(&context), "in ~1900");
}

#[test]
fn frame_placeholders_survive_path_defaults() {
    let mut context = SubstitutionContext::new();
    context.set_frame(7);

    let sequence = PathValue::new("/seq/test.###.exr");
    assert_eq!(sequence.value(&context), "/seq/test.###.exr");

    let frame = PathValue::new("/seq/test.###.exr").with_substitutions(Substitutions::ALL);
    let first = frame.hash(&context);
    assert_eq!(frame.value(&context), "/seq/test.007.exr");
    context.set_frame(8);
    assert_ne!(frame.hash(&context), first);
}

#[test]
fn values_use_platform_conventions() {
    let context = SubstitutionContext::new();
    let drive = PathValue::new("C:/path/test.exr").with_platform(platform::windows());
    assert_eq!(drive.value(&context), "C:\\path\\test.exr");

    let unc = PathValue::new("/test.server/path/test.exr");
    let native = unc.clone().with_platform(platform::windows()).value(&context);
    assert_eq!(native, "\\\\test.server\\path\\test.exr");
    assert_eq!(unc.with_platform(platform::posix()).value(&context), "/test.server/path/test.exr");
}
