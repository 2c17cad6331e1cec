// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

use anyhow::Result;
use exconf::BoxKind;
use exconf::pipeline::PortMeta;

fn describe(port: &PortMeta) -> String {
    let requirement = if port.required { "required" } else { "optional" };
    format!("{} ({}, {})", port.name, port.type_name(), requirement)
}

/// List every box type with its ports.
pub fn run() -> Result<()> {
    println!("Available boxes ({}):\n", BoxKind::ALL.len());

    for kind in BoxKind::ALL {
        println!("  {}", kind.type_name());
        println!("    {}", kind.default_name());

        if !kind.input_ports().is_empty() {
            println!("    Inputs:");
            for port in kind.input_ports() {
                println!("      - {}", describe(port));
            }
        }

        if !kind.output_ports().is_empty() {
            println!("    Outputs:");
            for port in kind.output_ports() {
                println!("      - {}", describe(port));
            }
        }

        println!();
    }

    Ok(())
}
