//! AWS SDK implementation of the `CloudApi` port.

use anyhow::{Context, Result};
use aws_config::BehaviorVersion;
use aws_config::Region;

use crate::application::ports::{CloudApi, LogGroupDeletion};

/// STS, ECR and CloudWatch Logs clients sharing one SDK config.
#[derive(Debug, Clone)]
pub struct AwsCloud {
    sts: aws_sdk_sts::Client,
    ecr: aws_sdk_ecr::Client,
    logs: aws_sdk_cloudwatchlogs::Client,
}

impl AwsCloud {
    /// Load the default credential chain for `region`.
    ///
    /// Credentials are resolved lazily on the first call, so this never
    /// fails and never touches the network.
    pub async fn connect(region: &str) -> Self {
        let sdk = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(region.to_owned()))
            .load()
            .await;
        tracing::debug!(region, "aws sdk config loaded");
        Self {
            sts: aws_sdk_sts::Client::new(&sdk),
            ecr: aws_sdk_ecr::Client::new(&sdk),
            logs: aws_sdk_cloudwatchlogs::Client::new(&sdk),
        }
    }
}

impl CloudApi for AwsCloud {
    async fn caller_account_id(&self) -> Result<String> {
        let identity = self
            .sts
            .get_caller_identity()
            .send()
            .await
            .context("sts GetCallerIdentity")?;
        identity
            .account()
            .map(str::to_owned)
            .ok_or_else(|| anyhow::anyhow!("GetCallerIdentity returned no account id"))
    }

    async fn registry_authorization_tokens(&self) -> Result<Vec<String>> {
        let auth = self
            .ecr
            .get_authorization_token()
            .send()
            .await
            .context("ecr GetAuthorizationToken")?;
        Ok(auth
            .authorization_data()
            .iter()
            .filter_map(|data| data.authorization_token().map(str::to_owned))
            .collect())
    }

    async fn delete_log_group(&self, name: &str) -> Result<LogGroupDeletion> {
        match self.logs.delete_log_group().log_group_name(name).send().await {
            Ok(_) => Ok(LogGroupDeletion::Deleted),
            Err(err)
                if err
                    .as_service_error()
                    .is_some_and(|e| e.is_resource_not_found_exception()) =>
            {
                Ok(LogGroupDeletion::NotFound)
            }
            Err(err) => Err(err).context("logs DeleteLogGroup"),
        }
    }
}
