//! Create an LXD container, make it reachable over SSH and provision it with
//! Ansible playbooks.
//!
//! The binary (`lazy-lxd`) wires the subsystems together through
//! [`controller::Controller`]; the privileged `lazy-lxd-fill-hosts` helper
//! lives in [`host_registration::helper`].

pub mod configuration;
pub mod container_management;
pub mod controller;
pub mod error_handling;
pub mod host_registration;
pub mod key_management;
pub mod playbook_runner;
pub mod prompt;
