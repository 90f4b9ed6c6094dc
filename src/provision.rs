//! Base-image provisioning interface.
//!
//! The shipped archive installs onto a minimal device image that must
//! already carry the Python runtime and the native libraries the wheels
//! link against. This module is the declarative description of that image:
//! a fixed list of OS-package installation steps with no sequencing logic
//! or state. Image builds themselves happen outside this tool.

/// One OS package the base image must provide.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProvisionStep {
    /// Package name as known to the image's package manager.
    pub package: &'static str,
    /// Why the runtime needs it.
    pub purpose: &'static str,
}

/// Packages required by the shipped wheels at install time.
pub const BASE_IMAGE_PACKAGES: &[ProvisionStep] = &[
    ProvisionStep {
        package: "python3",
        purpose: "runtime interpreter",
    },
    ProvisionStep {
        package: "python3-pip",
        purpose: "installs the shipped wheels",
    },
    ProvisionStep {
        package: "python3-venv",
        purpose: "isolated application environment",
    },
    ProvisionStep {
        package: "libffi8",
        purpose: "native extension loading",
    },
    ProvisionStep {
        package: "libssl3",
        purpose: "TLS for device reporting",
    },
];

/// Render the provisioning steps as a shell script fragment.
///
/// One `apt-get install` line per package keeps image-build logs attributable
/// to a single step.
#[must_use]
pub fn install_script() -> String {
    let mut lines = vec![
        "#!/bin/sh".to_owned(),
        "set -eu".to_owned(),
        String::new(),
        "apt-get update".to_owned(),
    ];
    for step in BASE_IMAGE_PACKAGES {
        lines.push(format!(
            "apt-get install -y --no-install-recommends {}  # {}",
            step.package, step.purpose
        ));
    }
    lines.push(String::new());
    lines.join("\n")
}
