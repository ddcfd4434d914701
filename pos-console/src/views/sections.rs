//! Per-section list tables

use shared::models::{
    ActivityLog, BackupRecord, Branch, Customer, Employee, Product, RecordStatus, User,
};
use shared::util::{format_bytes, format_currency, format_timestamp};

use super::table::{Cell, Table};

fn status_badge(status: RecordStatus) -> Cell {
    let label = match status {
        RecordStatus::Active => "Active",
        RecordStatus::Inactive => "Inactive",
    };
    Cell::badge(status.as_str(), label)
}

fn or_dash(value: &str) -> Cell {
    if value.trim().is_empty() {
        Cell::text("-")
    } else {
        Cell::text(value)
    }
}

pub fn users(users: &[User]) -> Table {
    Table::new(["Username", "Full name", "Email", "Role", "Status", "Last login"])
        .placeholder("No users found")
        .rows(users.iter().map(|u| {
            vec![
                Cell::text(&u.username),
                or_dash(&u.full_name),
                or_dash(&u.email),
                Cell::badge(u.role.as_str(), u.role.as_str()),
                status_badge(u.status),
                Cell::text(format_timestamp(u.last_login.unwrap_or(0))),
            ]
        }))
}

pub fn branches(branches: &[Branch]) -> Table {
    Table::new(["Name", "Address", "Phone", "Status"])
        .placeholder("No branches found")
        .rows(branches.iter().map(|b| {
            vec![
                Cell::text(&b.name),
                or_dash(&b.address),
                or_dash(&b.phone),
                status_badge(b.status),
            ]
        }))
}

pub fn employees(employees: &[Employee], branches: &[Branch], currency: &str) -> Table {
    let branch_name = |id: Option<&str>| {
        id.and_then(|id| branches.iter().find(|b| b.id == id))
            .map(|b| b.name.as_str())
            .unwrap_or("-")
    };
    Table::new(["Name", "Position", "Branch", "Salary", "Commission", "Status"])
        .placeholder("No employees found")
        .rows(employees.iter().map(|e| {
            vec![
                Cell::text(&e.name),
                or_dash(&e.position),
                Cell::text(branch_name(e.branch_id.as_deref())),
                Cell::text(format_currency(e.salary, currency)),
                Cell::text(format!("{}%", e.commission_rate)),
                status_badge(e.status),
            ]
        }))
}

pub fn products(products: &[Product], currency: &str) -> Table {
    Table::new(["Name", "SKU", "Category", "Price", "Stock", "Status"])
        .placeholder("No products found")
        .rows(products.iter().map(|p| {
            let stock = if p.is_low_stock() {
                Cell::badge("low-stock", &p.stock.to_string())
            } else {
                Cell::text(p.stock.to_string())
            };
            vec![
                Cell::text(&p.name),
                or_dash(&p.sku),
                or_dash(&p.category),
                Cell::text(format_currency(p.price, currency)),
                stock,
                status_badge(p.status),
            ]
        }))
}

pub fn customers(customers: &[Customer], currency: &str) -> Table {
    Table::new(["Name", "Phone", "Email", "Points", "Total spent"])
        .placeholder("No customers found")
        .rows(customers.iter().map(|c| {
            vec![
                Cell::text(&c.name),
                or_dash(&c.phone),
                or_dash(&c.email),
                Cell::text(c.points.to_string()),
                Cell::text(format_currency(c.total_spent, currency)),
            ]
        }))
}

pub fn backups(backups: &[BackupRecord]) -> Table {
    Table::new(["Name", "Date", "Size", "Created by", "Type"])
        .placeholder("No backups yet")
        .rows(backups.iter().map(|b| {
            let kind = match b.kind {
                shared::models::BackupKind::Manual => "manual",
                shared::models::BackupKind::Auto => "auto",
            };
            vec![
                Cell::text(&b.name),
                Cell::text(format_timestamp(b.timestamp)),
                Cell::text(format_bytes(b.size)),
                Cell::text(&b.user),
                Cell::badge(kind, kind),
            ]
        }))
}

pub fn activity(logs: &[ActivityLog]) -> Table {
    Table::new(["Time", "User", "Action", "Type", "Target"])
        .placeholder("No activity recorded")
        .rows(logs.iter().map(|log| {
            vec![
                Cell::text(format_timestamp(log.timestamp)),
                Cell::text(&log.username),
                Cell::text(log.action.label()),
                Cell::badge(log.kind.as_str(), log.kind.as_str()),
                or_dash(log.target.as_deref().unwrap_or("")),
            ]
        }))
}
