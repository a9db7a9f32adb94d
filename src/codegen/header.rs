use super::ScriptWriter;
use crate::buffer::CodeBuffer;
use crate::error::Result;
use crate::param::py_repr;
use crate::settings::keys;

const NUMPY_IMPORTS: [&str; 13] = [
    "sin", "cos", "tan", "log", "log10", "pi", "average", "sqrt", "std", "deg2rad", "rad2deg",
    "linspace", "asarray",
];

const NUMPY_RANDOM_IMPORTS: [&str; 4] = ["random", "randint", "normal", "shuffle"];

impl ScriptWriter<'_> {
    // ── Init phase ─────────────────────────────────────────────────────

    pub(super) fn emit_header(&self, buf: &mut CodeBuffer) {
        buf.write(&format!(
            "#!/usr/bin/env python2\n\
             # -*- coding: utf-8 -*-\n\
             \"\"\"\n\
             This experiment was created using PsychoPy2 Experiment Builder (v{version}),\n\
             \x20   on {timestamp}\n\
             If you publish work using this script please cite the PsychoPy publications:\n\
             \x20   Peirce, JW (2007) PsychoPy - Psychophysics software in Python.\n\
             \x20       Journal of Neuroscience Methods, 162(1-2), 8-13.\n\
             \x20   Peirce, JW (2009) Generating stimuli for neuroscience using PsychoPy.\n\
             \x20       Frontiers in Neuroinformatics, 2:10. doi: 10.3389/neuro.11.010.2008\n\
             \"\"\"\n\
             \n\
             from __future__ import absolute_import, division\n",
            version = self.ctx.version,
            timestamp = self.ctx.timestamp,
        ));
    }

    /// Pin the runtime version before anything version-sensitive is imported.
    pub(super) fn emit_use_version(&self, buf: &mut CodeBuffer) -> Result<()> {
        let version = self.params.text(keys::USE_VERSION)?;
        if !version.is_empty() {
            buf.write_indented_lines(&format!(
                "\nimport psychopy\npsychopy.useVersion({})\n\n",
                py_repr(version)
            ));
        }
        Ok(())
    }

    pub(super) fn emit_imports(&self, buf: &mut CodeBuffer) -> Result<()> {
        let libs = self.ctx.libs();
        buf.write(&format!(
            "from psychopy import locale_setup, {libs}\n\
             from psychopy.constants import (NOT_STARTED, STARTED, PLAYING, PAUSED,\n\
             \x20                               STOPPED, FINISHED, PRESSED, RELEASED, FOREVER)\n\
             import numpy as np  # whole numpy lib is available, prepend 'np.'\n\
             from numpy import ({np_head},\n\
             \x20                  {np_tail})\n\
             from numpy.random import {np_random}\n\
             import os  # handy system and path functions\n\
             import sys  # to get file system encoding\n",
            libs = libs.join(", "),
            np_head = NUMPY_IMPORTS[..7].join(", "),
            np_tail = NUMPY_IMPORTS[7..].join(", "),
            np_random = NUMPY_RANDOM_IMPORTS.join(", "),
        ));

        // The hardware client is an optional runtime dependency.
        if self.params.flag(keys::USE_IOHUB)? {
            buf.write(
                "\n# include ioHub imports\n\
                 from psychopy.iohub.client import launchHubServer\n\n",
            );
        }
        Ok(())
    }
}
