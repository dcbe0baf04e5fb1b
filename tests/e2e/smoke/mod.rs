//! Smoke tests for a live provisioning server
