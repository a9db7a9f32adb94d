use super::start::is_absolute_expr;
use super::*;
use crate::context::{ComponentRef, Routine};
use crate::display::{FixedDisplays, Headless};
use crate::error::ErrorKind;
use crate::param::Value;
use crate::settings::{BuilderPrefs, SettingsDefaults};

fn ctx() -> GenContext {
    let mut ctx = GenContext::new("1.85.0", "October 17, 2026, at 10:00");
    ctx.exp_path = "/home/lab/stroop.psyexp".to_string();
    ctx.required_libs = ["core", "data", "event", "logging", "sound"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    ctx
}

fn params(defaults: SettingsDefaults) -> ParamSet {
    defaults.build(&BuilderPrefs::default())
}

fn generate_with(set: &ParamSet, ctx: &GenContext) -> ScriptOutput {
    generate_script(set, ctx, &FixedDisplays::new(vec![(1920, 1080)])).expect("codegen failed")
}

fn generate(defaults: SettingsDefaults) -> ScriptOutput {
    generate_with(&params(defaults), &ctx())
}

fn script(defaults: SettingsDefaults) -> String {
    generate(defaults).code
}

fn with_iohub(defaults: SettingsDefaults) -> SettingsDefaults {
    SettingsDefaults {
        use_io_hub: true,
        ..defaults
    }
}

#[test]
fn codegen_header_and_imports() {
    let code = script(SettingsDefaults::default());

    assert!(code.starts_with("#!/usr/bin/env python2\n# -*- coding: utf-8 -*-\n"));
    assert!(code.contains("PsychoPy2 Experiment Builder (v1.85.0),\n    on October 17, 2026, at 10:00\n"));
    assert!(code.contains(
        "from psychopy import locale_setup, core, data, event, logging, sound, visual, gui\n"
    ));
    assert!(code.contains(
        "from numpy import (sin, cos, tan, log, log10, pi, average,\n                   sqrt, std, deg2rad, rad2deg, linspace, asarray)\n"
    ));
    assert!(code.contains("from numpy.random import random, randint, normal, shuffle\n"));
    assert!(!code.contains("launchHubServer"));
}

#[test]
fn codegen_version_pin_follows_header() {
    let code = script(SettingsDefaults {
        use_version: "1.84.2".to_string(),
        ..Default::default()
    });

    let future = code.find("from __future__ import absolute_import, division\n").unwrap();
    let pin = code.find("import psychopy\npsychopy.useVersion('1.84.2')\n").unwrap();
    let imports = code.find("from psychopy import locale_setup").unwrap();
    assert!(future < pin);
    assert!(pin < imports);
}

#[test]
fn codegen_no_pin_without_version() {
    let code = script(SettingsDefaults {
        use_version: String::new(),
        ..Default::default()
    });
    assert!(!code.contains("useVersion"));
    assert!(!code.contains("import psychopy\n"));
}

#[test]
fn codegen_phase_order() {
    let code = script(SettingsDefaults::default());

    let positions: Vec<usize> = [
        "from psychopy import",
        "_thisDir = os.path.dirname",
        "expInfo = ",
        "filename = ",
        "thisExp = data.ExperimentHandler(",
        "logging.console.setLevel",
        "endExpNow = False",
        "# Setup the Window",
        "frameDur = 1.0 / 60.0",
        "thisExp.abort()",
        "core.quit()\n",
    ]
    .iter()
    .map(|needle| code.find(needle).unwrap_or_else(|| panic!("missing {needle}")))
    .collect();
    assert!(positions.windows(2).all(|w| w[0] < w[1]), "{positions:?}");
}

#[test]
fn codegen_untitled_when_name_empty() {
    let code = script(SettingsDefaults::default());
    assert!(code.contains("expName = 'untitled'\n"));
}

#[test]
fn codegen_named_experiment() {
    let code = script(SettingsDefaults {
        exp_name: "stroop".to_string(),
        ..Default::default()
    });
    assert!(code.contains("expName = 'stroop'  # from the Builder filename that created this script\n"));
}

#[test]
fn codegen_info_dialog_toggle() {
    let code = script(SettingsDefaults::default());
    assert!(code.contains("expInfo = {'participant':'', 'session':'001'}\n"));
    assert!(code.contains(
        "dlg = gui.DlgFromDict(dictionary=expInfo, title=expName)\nif dlg.OK == False:\n    core.quit()  # user pressed cancel\n"
    ));

    let code = script(SettingsDefaults {
        show_exp_info: false,
        ..Default::default()
    });
    assert!(!code.contains("DlgFromDict"));
    assert!(code.contains("expInfo['date'] = data.getDateStr()  # add a simple timestamp\n"));
}

#[test]
fn codegen_bare_info_is_canonicalized() {
    let out = generate(SettingsDefaults {
        exp_info: "participant:'', session:'001'".to_string(),
        ..Default::default()
    });
    assert!(out.code.contains("expInfo = {'participant': '', 'session': '001'}\n"));
    assert_eq!(
        out.params.text(keys::EXP_INFO).unwrap(),
        "{'participant': '', 'session': '001'}"
    );
}

#[test]
fn codegen_invalid_info_is_fatal() {
    let set = params(SettingsDefaults {
        exp_info: "{'participant': ".to_string(),
        ..Default::default()
    });
    let err = generate_script(&set, &ctx(), &Headless).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::InvalidExpInfo(_)));
}

#[test]
fn codegen_relative_filename_rooted_at_script() {
    let code = script(SettingsDefaults::default());
    assert!(code.contains(
        "filename = _thisDir + os.sep + u'data/%s_%s_%s' % (expInfo['participant'], expName, expInfo['date'])\n"
    ));
}

#[test]
fn codegen_absolute_filename_kept() {
    let code = script(SettingsDefaults {
        filename: Some("'/srv/results/run'".to_string()),
        ..Default::default()
    });
    assert!(code.contains("filename = '/srv/results/run'\n"));
}

#[test]
fn codegen_empty_filename_gets_timestamped_default() {
    let code = script(SettingsDefaults {
        filename: Some(String::new()),
        ..Default::default()
    });
    assert!(code.contains(
        "filename = _thisDir + os.sep + 'data' + os.sep + u'psychopy_data_' + data.getDateStr()\n"
    ));
}

#[test]
fn codegen_legacy_folder_uses_participant_field() {
    let out = generate(SettingsDefaults {
        exp_info: "{'Subject': '', 'session': '001'}".to_string(),
        saved_data_folder: Some("old_data".to_string()),
        ..Default::default()
    });
    assert!(out.code.contains(
        "filename = _thisDir + os.sep + 'old_data' + os.sep + '%s_%s' % (expInfo['Subject'], expInfo['date'])\n"
    ));
    assert!(!out.params.contains(keys::SAVED_DATA_FOLDER));
}

#[test]
fn codegen_experiment_handler_block() {
    let code = script(SettingsDefaults {
        save_psydat_file: false,
        ..Default::default()
    });
    assert!(code.contains(
        "\n# An ExperimentHandler isn't essential but helps with data saving\n\
         thisExp = data.ExperimentHandler(name=expName, version='',\n\
         \x20   extraInfo=expInfo, runtimeInfo=None,\n\
         \x20   originPath='/home/lab/stroop.psyexp',\n\
         \x20   savePickle=False, saveWideText=True,\n\
         \x20   dataFileName=filename)\n"
    ));
}

#[test]
fn codegen_log_file_level() {
    let code = script(SettingsDefaults {
        logging: "debug".to_string(),
        ..Default::default()
    });
    assert!(code.contains("logFile = logging.LogFile(filename+'.log', level=logging.DEBUG)\n"));
    assert!(code.contains(
        "logging.console.setLevel(logging.WARNING)  # this outputs to the screen, not a file\n"
    ));

    let code = script(SettingsDefaults {
        save_log_file: false,
        ..Default::default()
    });
    assert!(!code.contains("logFile"));
    assert!(!code.contains("logging.flush()"));
    assert!(code.contains("logging.console.setLevel(logging.WARNING)"));
}

#[test]
fn codegen_escape_flag() {
    assert!(script(SettingsDefaults::default()).contains("endExpNow = False"));
    let code = script(SettingsDefaults {
        enable_escape: false,
        ..Default::default()
    });
    assert!(!code.contains("endExpNow"));
}

#[test]
fn codegen_full_screen_window() {
    let code = script(SettingsDefaults::default());
    assert!(code.contains(
        "win = visual.Window(\n\
         \x20   size=(1920, 1080), fullscr=True, screen=0,\n\
         \x20   allowGUI=False, allowStencil=False,\n\
         \x20   monitor='testMonitor', color=[0,0,0], colorSpace='rgb',\n\
         \x20   blendMode='avg', useFBO=True)\n"
    ));
}

#[test]
fn codegen_windowed_with_units() {
    let code = script(SettingsDefaults {
        full_scr: false,
        units: "deg".to_string(),
        color: "black".to_string(),
        ..Default::default()
    });
    assert!(code.contains("    size=(1024, 768), fullscr=False, screen=0,\n"));
    assert!(code.contains("    allowGUI=True, allowStencil=False,\n"));
    assert!(code.contains("color='black'"));
    assert!(code.contains("    blendMode='avg', useFBO=True,\n    units='deg')\n"));
}

#[test]
fn codegen_components_drive_window_flags() {
    let mut ctx = ctx();
    ctx.inventory.routines.push(Routine {
        name: "trial".to_string(),
        components: vec![
            ComponentRef {
                name: "aperture".to_string(),
                kind: "Aperture".to_string(),
            },
            ComponentRef {
                name: "rating".to_string(),
                kind: "RatingScale".to_string(),
            },
        ],
    });
    let out = generate_with(&params(SettingsDefaults::default()), &ctx);
    assert!(out.code.contains("    allowGUI=True, allowStencil=True,\n"));
}

#[test]
fn codegen_missing_screen_warns() {
    let out = generate(SettingsDefaults {
        screen: 2,
        ..Default::default()
    });
    assert!(out.code.contains("fullscr=True, screen=0,"));
    assert_eq!(out.warnings.len(), 1);
    assert!(out.warnings[0].contains("Requested screen can't be found"));
}

#[test]
fn codegen_microphone_switch_on() {
    let mut ctx = ctx();
    assert!(!generate_with(&params(SettingsDefaults::default()), &ctx)
        .code
        .contains("microphone.switchOn()"));
    ctx.required_libs.push("microphone".to_string());
    let code = generate_with(&params(SettingsDefaults::default()), &ctx).code;
    assert!(code.contains("\n# Enable sound input/output:\nmicrophone.switchOn()\n"));
}

#[test]
fn codegen_frame_rate_probe() {
    let code = script(SettingsDefaults::default());
    assert!(code.contains(
        "# store frame rate of monitor if we can measure it\n\
         expInfo['frameRate'] = win.getActualFrameRate()\n\
         if expInfo['frameRate'] != None:\n\
         \x20   frameDur = 1.0 / round(expInfo['frameRate'])\n\
         else:\n\
         \x20   frameDur = 1.0 / 60.0  # could not measure, so guess\n"
    ));
}

#[test]
fn codegen_end_saves_per_flag() {
    let code = script(SettingsDefaults::default());
    assert!(code.ends_with(
        "# these shouldn't be strictly necessary (should auto-save)\n\
         thisExp.saveAsWideText(filename+'.csv')\n\
         thisExp.saveAsPickle(filename)\n\
         logging.flush()\n\
         # make sure everything is closed down\n\
         thisExp.abort()  # or data files will save again on exit\n\
         win.close()\n\
         core.quit()\n"
    ));

    let code = script(SettingsDefaults {
        save_wide_csv_file: false,
        save_psydat_file: false,
        ..Default::default()
    });
    assert!(!code.contains("saveAsWideText"));
    assert!(!code.contains("saveAsPickle"));
    assert!(code.contains("thisExp.abort()"));
}

#[test]
fn codegen_iohub_launch() {
    let code = script(with_iohub(SettingsDefaults::default()));

    assert!(code.contains("\n# include ioHub imports\nfrom psychopy.iohub.client import launchHubServer\n"));
    assert!(code.contains(
        "\n# >> Begin Launch ioHub Server Code\n\
         \n\
         # start the ioHub Server\n\
         iohub_server = launchHubServer(iohub_config_name=u\"iohub_config.yaml\",\n\
         \x20   Display=dict(device_number=0, reporting_unit_type='pix'),\n\
         \x20   psychopy_monitor_name=\"testMonitor\")\n\
         \n\
         # << End Launch ioHub Server Code\n"
    ));
    assert!(code.contains("win.close()\niohub_server.quit()\ncore.quit()\n"));
}

#[test]
fn codegen_iohub_hdf5_session_info() {
    let code = script(with_iohub(SettingsDefaults {
        use_hdf5: true,
        units: "norm".to_string(),
        ..Default::default()
    }));
    assert!(code.contains("Display=dict(device_number=0, reporting_unit_type='norm')"));
    assert!(code.contains("experiment_info=dict(code=expName)"));
    assert!(code.contains("session_info=dict(code=expInfo.get(u'session'))"));
    assert!(code.contains("datastore_name=filename)"));

    let code = script(with_iohub(SettingsDefaults {
        use_hdf5: true,
        exp_info: "{'participant': ''}".to_string(),
        ..Default::default()
    }));
    assert!(code.contains("experiment_info=dict(code=expName)"));
    assert!(!code.contains("session_info"));
}

#[test]
fn codegen_iohub_without_hdf5_has_no_datastore() {
    let code = script(with_iohub(SettingsDefaults::default()));
    assert!(!code.contains("experiment_info"));
    assert!(!code.contains("datastore_name"));
}

#[test]
fn codegen_iohub_missing_absolute_config_warns() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("absent.yaml");
    let out = generate(with_iohub(SettingsDefaults {
        io_hub_config_file: missing.display().to_string(),
        ..Default::default()
    }));
    assert!(!out.code.contains("iohub_config_name"));
    assert!(out.code.contains("launchHubServer(Display=dict("));
    assert_eq!(out.warnings.len(), 1);
    assert!(out.warnings[0].contains("absent.yaml"));
}

#[test]
fn codegen_iohub_existing_absolute_config_kept() {
    let file = tempfile::NamedTempFile::new().unwrap();
    let path = file.path().display().to_string();
    let out = generate(with_iohub(SettingsDefaults {
        io_hub_config_file: path.clone(),
        ..Default::default()
    }));
    assert!(out.code.contains(&format!("iohub_config_name=u\"{path}\"")));
    assert!(out.warnings.is_empty());
}

#[test]
fn codegen_iohub_screen_matches_window() {
    let set = params(with_iohub(SettingsDefaults {
        screen: 2,
        ..Default::default()
    }));
    let out = generate_script(
        &set,
        &ctx(),
        &FixedDisplays::new(vec![(1920, 1080), (1280, 1024)]),
    )
    .unwrap();
    assert!(out.code.contains("size=(1280, 1024), fullscr=True, screen=1,"));
    assert!(out.code.contains("Display=dict(device_number=1,"));
}

#[test]
fn codegen_missing_param_is_fatal() {
    let mut set = params(SettingsDefaults::default());
    set.remove(keys::MONITOR);
    let err = generate_script(&set, &ctx(), &Headless).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::MissingParam(_)));
}

#[test]
fn codegen_disallowed_value_is_fatal() {
    let mut set = params(SettingsDefaults::default());
    set.set(keys::COLOR_SPACE, Value::str("cmyk")).unwrap();
    let err = generate_script(&set, &ctx(), &Headless).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::DisallowedValue { .. }));
}

#[test]
fn codegen_flags_set_from_text() {
    let mut set = params(SettingsDefaults::default());
    set.set(keys::FULL_SCREEN, Value::str("False")).unwrap();
    set.set(keys::SAVE_LOG, Value::str("false")).unwrap();
    let code = generate_with(&set, &ctx()).code;
    assert!(code.contains("size=(1024, 768), fullscr=False, screen=0,"));
    assert!(!code.contains("logFile"));
}

#[test]
fn codegen_flag_with_junk_text_is_fatal() {
    let mut set = params(SettingsDefaults::default());
    set.set(keys::SHOW_MOUSE, Value::str("maybe")).unwrap();
    let err = generate_script(&set, &ctx(), &Headless).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::DisallowedType { ref key, .. } if key == keys::SHOW_MOUSE));
}

#[test]
fn codegen_input_set_left_untouched() {
    let set = params(SettingsDefaults {
        saved_data_folder: Some("old".to_string()),
        ..Default::default()
    });
    let before = set.clone();
    let _ = generate_with(&set, &ctx());
    assert_eq!(set, before);
}

#[test]
fn absolute_filename_detection() {
    assert!(is_absolute_expr("'/data/run'"));
    assert!(is_absolute_expr("u'/data/run'"));
    assert!(is_absolute_expr("r\"C:\\data\\run\""));
    assert!(is_absolute_expr("'\\\\server\\share'"));
    assert!(!is_absolute_expr("'data/run'"));
    assert!(!is_absolute_expr("u'data' + os.sep + expInfo['date']"));
    assert!(!is_absolute_expr("expInfo['participant']"));
    assert!(!is_absolute_expr("rootDir + 'x'"));
}
