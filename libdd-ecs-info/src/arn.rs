// Copyright 2026-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Extraction of the container instance id from a container instance ARN.

use crate::EcsInfoError;

/// Return the container instance id embedded in a container instance ARN.
///
/// ECS uses two ARN formats for container instances:
/// - `arn:aws:ecs:region:aws_account_id:container-instance/container-instance-id`
/// - `arn:aws:ecs:region:aws_account_id:container-instance/cluster-name/container-instance-id`
///
/// Both yield `container-instance-id`. Anything else is a [`EcsInfoError::MalformedArn`].
///
/// # Example
/// ```
/// use libdd_ecs_info::container_instance_id_from_arn;
///
/// let id = container_instance_id_from_arn(
///     "arn:aws:ecs:us-west-2:123456789012:container-instance/my-cluster/47c0ab6e",
/// )
/// .unwrap();
/// assert_eq!(id, "47c0ab6e");
/// ```
pub fn container_instance_id_from_arn(arn: &str) -> Result<String, EcsInfoError> {
    let malformed = || EcsInfoError::MalformedArn(arn.to_owned());

    // The sixth segment is the resource: `container-instance/<id>` or
    // `container-instance/<cluster-name>/<id>`.
    let resource = arn.split(':').nth(5).ok_or_else(malformed)?;
    match resource.split('/').collect::<Vec<_>>().as_slice() {
        [_, id] | [_, _, id] => Ok((*id).to_owned()),
        _ => Err(malformed()),
    }
}
