use assetgoblin::core::UpgradeError;
use assetgoblin::upgrade::release::{Asset, Release};
use assetgoblin::upgrade::selector::{artifact_name, select_assets};
use assetgoblin::upgrade::{ArchiveFormat, PlatformProfile};

#[test]
fn test_artifact_names_for_published_platforms() {
    let cases = [
        ("linux", "x86_64", "AssetGoblin_Linux_x64.tar.gz"),
        ("linux", "aarch64", "AssetGoblin_Linux_arm64.tar.gz"),
        ("linux", "x86", "AssetGoblin_Linux_x86.tar.gz"),
        ("linux", "arm", "AssetGoblin_Linux_arm.tar.gz"),
        ("macos", "x86_64", "AssetGoblin_macOS_x64.tar.gz"),
        ("macos", "aarch64", "AssetGoblin_macOS_arm64.tar.gz"),
        ("windows", "x86_64", "AssetGoblin_Windows_x64.zip"),
        ("windows", "x86", "AssetGoblin_Windows_x86.zip"),
        ("freebsd", "x86_64", "AssetGoblin_Freebsd_x64.tar.gz"),
    ];

    for (os, arch, expected) in cases {
        let profile = PlatformProfile::resolve(os, arch).unwrap();
        assert_eq!(artifact_name("AssetGoblin", &profile), expected, "{os}/{arch}");
    }
}

#[test]
fn test_format_follows_platform_family() {
    for os in ["linux", "macos", "freebsd", "openbsd"] {
        let profile = PlatformProfile::resolve(os, "x86_64").unwrap();
        assert_eq!(profile.format, ArchiveFormat::TarGz, "{os}");
    }
    let profile = PlatformProfile::resolve("windows", "aarch64").unwrap();
    assert_eq!(profile.format, ArchiveFormat::Zip);
}

#[test]
fn test_executable_names_never_collide() {
    let profile = PlatformProfile::resolve("linux", "x86_64").unwrap();
    let production = profile.executable_name("AssetGoblin");
    let staged = profile.staged_name("AssetGoblin", "v2.0.0");
    let backup = profile.backup_name("AssetGoblin", "1.0.0");

    assert_eq!(production, "AssetGoblin");
    assert_eq!(staged, "AssetGoblin_v2.0.0");
    assert_eq!(backup, "AssetGoblin_1.0.0");
    assert_ne!(production, staged);
    assert_ne!(staged, backup);
}

#[test]
fn test_unsupported_architectures() {
    for arch in ["mips", "powerpc64", "s390x", ""] {
        let err = PlatformProfile::resolve("linux", arch).unwrap_err();
        assert!(matches!(err, UpgradeError::UnsupportedPlatform { .. }), "{arch}");
    }
}

/// The selector finds the computed name among unrelated assets, whatever
/// their order.
#[test]
fn test_selection_for_computed_name() {
    let profile = PlatformProfile::resolve("linux", "x86_64").unwrap();
    let name = artifact_name("App", &profile);

    let mut assets = vec![
        Asset {
            name: "App_Windows_x64.zip".to_string(),
            download_url: "w".to_string(),
        },
        Asset {
            name: "App_0.2.0_checksums.txt".to_string(),
            download_url: "c".to_string(),
        },
        Asset {
            name: name.clone(),
            download_url: "l".to_string(),
        },
    ];

    for _ in 0..assets.len() {
        let release = Release {
            tag: "v0.2.0".to_string(),
            notes: String::new(),
            assets: assets.clone(),
        };
        let selected = select_assets(&release, &name).unwrap();
        assert_eq!(selected.artifact.download_url, "l");
        assert_eq!(selected.checksums.download_url, "c");
        assets.rotate_left(1);
    }
}
