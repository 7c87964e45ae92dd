// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod fn_unit;

pub use fn_unit::FnUnit;
