//! `hcp default-cluster`: print the cluster document a create request
//! starts from before user input is applied.

use anyhow::Result;
use clap::Args;
use hcp_api::Cluster;

use crate::EXIT_VALID;

#[derive(Args, Debug)]
pub struct DefaultClusterArgs {
    /// Azure location to stamp on the document.
    #[arg(long, default_value = "")]
    pub location: String,
}

pub fn default_cluster_document(args: &DefaultClusterArgs) -> Result<String> {
    let cluster = Cluster::new_default(None, args.location.as_str());
    Ok(serde_json::to_string_pretty(&cluster)?)
}

pub fn run_default_cluster(args: &DefaultClusterArgs) -> Result<u8> {
    println!("{}", default_cluster_document(args)?);
    Ok(EXIT_VALID)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_document_carries_location_and_defaults() {
        let args = DefaultClusterArgs {
            location: "westus3".to_string(),
        };
        let doc: serde_json::Value = serde_json::from_str(&default_cluster_document(&args).unwrap()).unwrap();
        assert_eq!(doc["location"], "westus3");
        assert!(doc.get("trackedResource").is_none());
        assert_eq!(doc["customerProperties"]["version"]["channelGroup"], "stable");
        assert_eq!(doc["customerProperties"]["network"]["hostPrefix"], 23);
    }
}
