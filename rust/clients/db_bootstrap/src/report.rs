//! Persian status lines printed while provisioning.

use std::io::Write;

/// Whether a provisioning step had to create the entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provisioned {
    Created,
    AlreadyExists,
}

impl Provisioned {
    pub fn created(&self) -> bool {
        matches!(self, Provisioned::Created)
    }
}

pub fn user(out: &mut impl Write, name: &str, outcome: Provisioned) -> std::io::Result<()> {
    match outcome {
        Provisioned::Created => writeln!(out, "کاربر {name} با موفقیت ایجاد شد."),
        Provisioned::AlreadyExists => writeln!(out, "کاربر {name} از قبل وجود دارد."),
    }
}

pub fn collection(out: &mut impl Write, name: &str, outcome: Provisioned) -> std::io::Result<()> {
    match outcome {
        Provisioned::Created => writeln!(out, "کالکشن {name} با موفقیت ایجاد شد."),
        Provisioned::AlreadyExists => writeln!(out, "کالکشن {name} از قبل وجود دارد."),
    }
}

pub fn indexes_ready(out: &mut impl Write) -> std::io::Result<()> {
    writeln!(out, "ایندکس‌های مورد نیاز با موفقیت ایجاد شدند.")
}

pub fn settings_seeded(out: &mut impl Write) -> std::io::Result<()> {
    writeln!(out, "تنظیمات پیش‌فرض سیستم با موفقیت ایجاد شدند.")
}

pub fn finished(out: &mut impl Write) -> std::io::Result<()> {
    writeln!(out, "راه‌اندازی اولیه MongoDB با موفقیت انجام شد.")
}
