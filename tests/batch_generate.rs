use std::fs;
use std::path::Path;

use expgen::display::FixedDisplays;
use expgen::runtime::BuiltinTemplates;

fn generate_all_in_dir(dir: &Path) {
    assert!(dir.is_dir(), "{} is not a directory", dir.display());

    let entries: Vec<_> = fs::read_dir(dir)
        .unwrap_or_else(|e| panic!("cannot read {}: {e}", dir.display()))
        .filter_map(|e| e.ok())
        .filter(|e| {
            e.path()
                .extension()
                .map(|ext| ext == "json")
                .unwrap_or(false)
        })
        .collect();

    assert!(!entries.is_empty(), "no .json documents found in {}", dir.display());

    let displays = FixedDisplays::new(vec![(1920, 1080)]);
    for entry in &entries {
        let path = entry.path();
        let source = fs::read_to_string(&path)
            .unwrap_or_else(|e| panic!("cannot read {}: {e}", path.display()));

        let out = expgen::generate_document(
            &source,
            "October 17, 2026, at 12:00",
            &displays,
            &BuiltinTemplates,
        )
        .unwrap_or_else(|e| panic!("{} failed to generate: {e}", path.display()));

        assert!(
            out.script.starts_with("#!/usr/bin/env python2\n"),
            "{} script missing shebang",
            path.display()
        );
        assert!(
            out.script.ends_with("core.quit()\n"),
            "{} script does not end with quit",
            path.display()
        );
        assert!(
            out.browser.ends_with("</html>"),
            "{} page not closed",
            path.display()
        );
        assert!(
            out.warnings.is_empty(),
            "{} produced warnings: {:?}",
            path.display(),
            out.warnings
        );
    }

    eprintln!("  generated {} documents from {}", entries.len(), dir.display());
}

#[test]
fn all_demos_generate() {
    let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("demos");
    generate_all_in_dir(&dir);
}

#[test]
fn legacy_demo_migrates_folder() {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("demos/legacy.json");
    let source = fs::read_to_string(path).unwrap();
    let out = expgen::generate_document(&source, "now", &FixedDisplays::new(vec![(800, 600)]), &BuiltinTemplates)
        .unwrap();

    assert!(out.script.contains(
        "filename = _thisDir + os.sep + 'results' + os.sep + '%s_%s' % (expInfo['Observer'], expInfo['date'])\n"
    ));
    assert!(!out.script.contains("useVersion"));
    assert!(!out.script.contains("logFile"));
    assert!(out.script.contains("microphone.switchOn()"));
    assert!(!out.script.contains("saveAsWideText"));
}

#[test]
fn eyetracking_demo_launches_hardware() {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("demos/eyetracking.json");
    let source = fs::read_to_string(path).unwrap();
    let out = expgen::generate_document(&source, "now", &FixedDisplays::new(vec![(1920, 1080)]), &BuiltinTemplates)
        .unwrap();

    assert!(out.script.contains("from psychopy import locale_setup, core, data, event, logging, iohub, visual, gui\n"));
    assert!(out.script.contains("expInfo = {'participant': '', 'session': '001', 'condition': 'A'}\n"));
    assert!(out.script.contains("size=(1280, 720), fullscr=False, screen=0,"));
    assert!(out.script.contains("allowGUI=True, allowStencil=True,"));
    assert!(out.script.contains("Display=dict(device_number=0, reporting_unit_type='pix')"));
    assert!(out.script.contains("session_info=dict(code=expInfo.get(u'session'))"));
    assert!(out.script.ends_with("iohub_server.quit()\ncore.quit()\n"));
    assert!(out.browser.contains("allowStencil: true,"));
}
