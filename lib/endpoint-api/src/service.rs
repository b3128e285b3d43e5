//! Catalog of AWS services reachable through VPC endpoints

use crate::ApiError;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Kind of VPC endpoint
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema)]
pub enum EndpointType {
    /// Route table based attachment
    Gateway,
    /// Network interface based attachment guarded by a security group
    Interface,
}

impl fmt::Display for EndpointType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EndpointType::Gateway => write!(f, "Gateway"),
            EndpointType::Interface => write!(f, "Interface"),
        }
    }
}

/// Capability flags of a catalog entry
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Capabilities {
    pub gateway: bool,
    pub interface: bool,
    pub private_dns: bool,
}

const GATEWAY: Capabilities = Capabilities {
    gateway: true,
    interface: false,
    private_dns: false,
};

const INTERFACE: Capabilities = Capabilities {
    gateway: false,
    interface: true,
    private_dns: true,
};

/// Identifier of a service in the endpoint catalog
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema)]
pub enum AwsService {
    S3,
    DynamoDb,
    SageMakerNotebook,
    CloudFormation,
    CodeBuild,
    CodeBuildFips,
    CodeCommit,
    CodeCommitFips,
    CodeCommitGit,
    CodeCommitGitFips,
    CodePipeline,
    Config,
    Ec2,
    Ec2Messages,
    Ecr,
    EcrDocker,
    ElasticInferenceRuntime,
    ElasticLoadBalancing,
    CloudWatchEvents,
    ApiGateway,
    KinesisStreams,
    Kms,
    CloudWatchLogs,
    CloudWatch,
    SageMakerApi,
    SageMakerRuntime,
    SageMakerRuntimeFips,
    SecretsManager,
    ServiceCatalog,
    Sns,
    Sqs,
    Ssm,
    SsmMessages,
    Sts,
    Transfer,
}

/// An entry of the endpoint service catalog
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EndpointService {
    pub id: AwsService,
    /// Identifier used in configuration documents
    pub key: &'static str,
    /// DNS prefix, `com.amazonaws` for all but a few services
    pub prefix: &'static str,
    /// DNS suffix appended after the region, e.g. `ecr.dkr`
    pub suffix: &'static str,
    pub capabilities: Capabilities,
}

const fn entry(
    id: AwsService,
    key: &'static str,
    prefix: &'static str,
    suffix: &'static str,
    capabilities: Capabilities,
) -> EndpointService {
    EndpointService {
        id,
        key,
        prefix,
        suffix,
        capabilities,
    }
}

const AMAZONAWS: &str = "com.amazonaws";

// Ordered by `AwsService` discriminant.
static CATALOG: [EndpointService; 35] = [
    entry(AwsService::S3, "S3", AMAZONAWS, "s3", GATEWAY),
    entry(AwsService::DynamoDb, "DynamoDb", AMAZONAWS, "dynamodb", GATEWAY),
    entry(AwsService::SageMakerNotebook, "SageMakerNotebook", "aws.sagemaker", "notebook", INTERFACE),
    entry(AwsService::CloudFormation, "CloudFormation", AMAZONAWS, "cloudformation", INTERFACE),
    entry(AwsService::CodeBuild, "CodeBuild", AMAZONAWS, "codebuild", INTERFACE),
    entry(AwsService::CodeBuildFips, "CodeBuildFips", AMAZONAWS, "codebuild-fips", INTERFACE),
    entry(AwsService::CodeCommit, "CodeCommit", AMAZONAWS, "codecommit", INTERFACE),
    entry(AwsService::CodeCommitFips, "CodeCommitFips", AMAZONAWS, "codecommit-fips", INTERFACE),
    entry(AwsService::CodeCommitGit, "CodeCommitGit", AMAZONAWS, "git-codecommit", INTERFACE),
    entry(AwsService::CodeCommitGitFips, "CodeCommitGitFips", AMAZONAWS, "git-codecommit-fips", INTERFACE),
    entry(AwsService::CodePipeline, "CodePipeline", AMAZONAWS, "codepipeline", INTERFACE),
    entry(AwsService::Config, "Config", AMAZONAWS, "config", INTERFACE),
    entry(AwsService::Ec2, "Ec2", AMAZONAWS, "ec2", INTERFACE),
    entry(AwsService::Ec2Messages, "Ec2Messages", AMAZONAWS, "ec2messages", INTERFACE),
    entry(AwsService::Ecr, "Ecr", AMAZONAWS, "ecr.api", INTERFACE),
    entry(AwsService::EcrDocker, "EcrDocker", AMAZONAWS, "ecr.dkr", INTERFACE),
    entry(AwsService::ElasticInferenceRuntime, "ElasticInferenceRuntime", AMAZONAWS, "elastic-inference.runtime", INTERFACE),
    entry(AwsService::ElasticLoadBalancing, "ElasticLoadBalancing", AMAZONAWS, "elasticloadbalancing", INTERFACE),
    entry(AwsService::CloudWatchEvents, "CloudWatchEvents", AMAZONAWS, "events", INTERFACE),
    entry(AwsService::ApiGateway, "ApiGateway", AMAZONAWS, "execute-api", INTERFACE),
    entry(AwsService::KinesisStreams, "KinesisStreams", AMAZONAWS, "kinesis-streams", INTERFACE),
    entry(AwsService::Kms, "Kms", AMAZONAWS, "kms", INTERFACE),
    entry(AwsService::CloudWatchLogs, "CloudWatchLogs", AMAZONAWS, "logs", INTERFACE),
    entry(AwsService::CloudWatch, "CloudWatch", AMAZONAWS, "monitoring", INTERFACE),
    entry(AwsService::SageMakerApi, "SageMakerApi", AMAZONAWS, "sagemaker.api", INTERFACE),
    entry(AwsService::SageMakerRuntime, "SageMakerRuntime", AMAZONAWS, "sagemaker.runtime", INTERFACE),
    entry(AwsService::SageMakerRuntimeFips, "SageMakerRuntimeFips", AMAZONAWS, "sagemaker.runtime-fips", INTERFACE),
    entry(AwsService::SecretsManager, "SecretsManager", AMAZONAWS, "secretsmanager", INTERFACE),
    entry(AwsService::ServiceCatalog, "ServiceCatalog", AMAZONAWS, "servicecatalog", INTERFACE),
    entry(AwsService::Sns, "Sns", AMAZONAWS, "sns", INTERFACE),
    entry(AwsService::Sqs, "Sqs", AMAZONAWS, "sqs", INTERFACE),
    entry(AwsService::Ssm, "Ssm", AMAZONAWS, "ssm", INTERFACE),
    entry(AwsService::SsmMessages, "SsmMessages", AMAZONAWS, "ssmmessages", INTERFACE),
    entry(AwsService::Sts, "Sts", AMAZONAWS, "sts", INTERFACE),
    entry(AwsService::Transfer, "Transfer", AMAZONAWS, "transfer.server", INTERFACE),
];

impl AwsService {
    /// All services in catalog order
    pub fn all() -> impl Iterator<Item = AwsService> {
        CATALOG.iter().map(|e| e.id)
    }

    /// Catalog entry for this service
    pub fn endpoint_service(self) -> &'static EndpointService {
        &CATALOG[self as usize]
    }
}

impl fmt::Display for AwsService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.endpoint_service().key)
    }
}

impl FromStr for AwsService {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AwsService::all()
            .find(|service| service.endpoint_service().key.eq_ignore_ascii_case(s))
            .ok_or_else(|| ApiError::UnknownService(s.to_string()))
    }
}

impl EndpointService {
    /// Fully qualified service name for a concrete region
    pub fn name(&self, region: &str) -> String {
        format!("{}.{}.{}", self.prefix, region, self.suffix)
    }

    /// Whether the service can be reached through the given endpoint kind
    pub fn supports(&self, endpoint_type: EndpointType) -> bool {
        match endpoint_type {
            EndpointType::Gateway => self.capabilities.gateway,
            EndpointType::Interface => self.capabilities.interface,
        }
    }

    /// Default for `PrivateDnsEnabled` on interface endpoints
    pub fn private_dns_required(&self) -> bool {
        self.capabilities.private_dns
    }
}
